//! Catalog operation errors.

use thiserror::Error;

use crate::model::ValidationError;
use crate::store::StoreError;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors returned by [`CatalogService`](super::CatalogService) operations.
///
/// Each variant maps to exactly one HTTP status in the API layer.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Missing or unknown token.
    #[error("Invalid token")]
    Unauthorized,

    /// Valid token, but the caller is not the required party.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced document does not exist.
    #[error("{kind} with ID {id} was not found")]
    NotFound { kind: &'static str, id: String },

    /// Pack exists but has no versions at all.
    #[error("Pack {0} has no versions")]
    NoVersions(String),

    /// Unique key already taken.
    #[error("{0}")]
    Conflict(String),

    /// Version name does not parse as semver.
    #[error("Version ID {0} is not valid semver. Reference: https://semver.org")]
    InvalidVersion(String),

    /// Request body failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Malformed request parameters.
    #[error("{0}")]
    BadRequest(String),

    /// No version of the pack supports the requested game version.
    #[error("Pack {pack} has no version supporting {game_version}")]
    NoCompatibleVersion { pack: String, game_version: String },

    /// Underlying store failed.
    #[error("Storage error: {0}")]
    Store(#[source] StoreError),
}

impl CatalogError {
    pub(crate) fn pack_not_found(id: &str) -> Self {
        CatalogError::NotFound {
            kind: "Pack",
            id: id.to_string(),
        }
    }

    pub(crate) fn bundle_not_found(uid: &str) -> Self {
        CatalogError::NotFound {
            kind: "Bundle",
            id: uid.to_string(),
        }
    }

    pub(crate) fn user_not_found(id: &str) -> Self {
        CatalogError::NotFound {
            kind: "User",
            id: id.to_string(),
        }
    }

    pub(crate) fn version_not_found(name: &str) -> Self {
        CatalogError::NotFound {
            kind: "Version",
            id: name.to_string(),
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => CatalogError::NotFound {
                kind: capitalized(kind),
                id,
            },
            StoreError::Conflict { kind: "pack", id } => {
                CatalogError::Conflict(format!("Pack with ID {} already exists in the database", id))
            }
            StoreError::Conflict { kind, id } => {
                CatalogError::Conflict(format!("{} {} already exists", kind, id))
            }
            other => CatalogError::Store(other),
        }
    }
}

fn capitalized(kind: &'static str) -> &'static str {
    match kind {
        "pack" => "Pack",
        "bundle" => "Bundle",
        "user" => "User",
        other => other,
    }
}
