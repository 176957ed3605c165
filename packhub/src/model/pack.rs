//! Pack document types and validation.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::user::UserId;
use super::version::PackVersion;
use crate::versioning;

/// Maximum length of a friendly pack id.
pub const MAX_PACK_ID_LEN: usize = 64;

static PACK_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid pack id pattern"));

/// Errors raised when user-supplied pack data is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pack id '{0}' must be 1-64 characters of letters, digits, '_', '-' or '.'")]
    InvalidPackId(String),

    #[error("display name must not be empty")]
    EmptyName,

    #[error("version '{name}' is not valid semver: {reason}")]
    InvalidVersion { name: String, reason: String },

    #[error("version '{0}' appears more than once")]
    DuplicateVersion(String),

    #[error("bundle name must not be empty")]
    EmptyBundleName,

    #[error("bundle game version must not be empty")]
    EmptyGameVersion,
}

/// Check that a friendly pack id is well formed.
pub fn validate_pack_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_PACK_ID_LEN || !PACK_ID_PATTERN.is_match(id) {
        return Err(ValidationError::InvalidPackId(id.to_string()));
    }
    Ok(())
}

/// Review lifecycle of a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackState {
    /// Created but not yet submitted for review.
    #[default]
    Unsubmitted,
    /// Awaiting review.
    Pending,
    /// Approved and listed.
    Accepted,
    /// Rejected by a reviewer.
    Rejected,
}

impl fmt::Display for PackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PackState::Unsubmitted => "unsubmitted",
            PackState::Pending => "pending",
            PackState::Accepted => "accepted",
            PackState::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Display metadata shown on pack cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackDisplay {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    /// Hidden packs are reachable by id but never listed.
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_page: Option<String>,
}

/// The user-editable half of a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackData {
    /// Friendly id. Overwritten with the stored pack id on update.
    #[serde(default)]
    pub id: String,
    pub display: PackDisplay,
    #[serde(default)]
    pub versions: Vec<PackVersion>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl PackData {
    /// Create pack data with a display name and nothing else.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: PackDisplay {
                name: name.into(),
                ..Default::default()
            },
            versions: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Validate the display name and version list.
    ///
    /// Every version name must parse as semver and be unique within the pack.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.display.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let mut seen = HashSet::new();
        for version in &self.versions {
            versioning::parse_version(&version.name).map_err(|e| {
                ValidationError::InvalidVersion {
                    name: version.name.clone(),
                    reason: e.to_string(),
                }
            })?;
            if !seen.insert(version.name.as_str()) {
                return Err(ValidationError::DuplicateVersion(version.name.clone()));
            }
        }
        Ok(())
    }

    /// Find a version by exact name.
    pub fn version(&self, name: &str) -> Option<&PackVersion> {
        self.versions.iter().find(|v| v.name == name)
    }

    /// Whether the pack carries every category in `required`.
    pub fn has_categories(&self, required: &[String]) -> bool {
        required.iter().all(|c| self.categories.contains(c))
    }
}

/// Cached download statistics, rewritten by the metrics job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadStats {
    pub total: u64,
    pub today: u64,
    pub past_week: u64,
}

/// Bookkeeping timestamps and download statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackStats {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub added: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub downloads: DownloadStats,
}

impl PackStats {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            added: now,
            updated: now,
            downloads: DownloadStats::default(),
        }
    }
}

/// A stored pack document.
///
/// The owner is fixed at creation and is always a contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    /// Store-generated document key.
    pub doc_id: String,
    /// Friendly id, globally unique.
    pub id: String,
    pub owner: UserId,
    pub contributors: Vec<UserId>,
    #[serde(default)]
    pub state: PackState,
    pub stats: PackStats,
    pub data: PackData,
    /// Incremented by the store on every replace.
    #[serde(default)]
    pub revision: u64,
}

impl Pack {
    /// Create a new, unsubmitted pack owned by `owner`.
    ///
    /// The friendly id is taken from `id` and written into `data.id`.
    pub fn new(
        doc_id: impl Into<String>,
        id: impl Into<String>,
        owner: UserId,
        mut data: PackData,
        now: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        data.id = id.clone();
        Self {
            doc_id: doc_id.into(),
            id,
            contributors: vec![owner.clone()],
            owner,
            state: PackState::Unsubmitted,
            stats: PackStats::new(now),
            data,
            revision: 0,
        }
    }

    pub fn is_owner(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    pub fn is_contributor(&self, user: &UserId) -> bool {
        self.contributors.contains(user)
    }

    /// Add contributors, skipping ones already present.
    ///
    /// Returns the number actually added.
    pub fn add_contributors(&mut self, users: &[UserId]) -> usize {
        let mut added = 0;
        for user in users {
            if !self.contributors.contains(user) {
                self.contributors.push(user.clone());
                added += 1;
            }
        }
        added
    }

    /// Remove contributors. The owner is never removed.
    ///
    /// Returns the number actually removed.
    pub fn remove_contributors(&mut self, users: &[UserId]) -> usize {
        let before = self.contributors.len();
        let owner = self.owner.clone();
        self.contributors
            .retain(|c| *c == owner || !users.contains(c));
        before - self.contributors.len()
    }

    /// Replace the editable data, keeping the friendly id.
    pub fn replace_data(&mut self, mut data: PackData, now: DateTime<Utc>) {
        data.id = self.id.clone();
        self.data = data;
        self.stats.updated = now;
    }

    /// Whether a listing should include this pack.
    pub fn is_listed(&self) -> bool {
        !self.data.display.hidden
    }

    pub fn meta(&self) -> PackMeta {
        PackMeta {
            doc_id: self.doc_id.clone(),
            stats: self.stats.clone(),
            owner: self.owner.clone(),
            contributors: self.contributors.clone(),
        }
    }

    pub fn summary(&self) -> PackSummary {
        PackSummary {
            id: self.id.clone(),
            display_name: self.data.display.name.clone(),
        }
    }
}

/// Ownership and statistics view of a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackMeta {
    pub doc_id: String,
    pub stats: PackStats,
    pub owner: UserId,
    pub contributors: Vec<UserId>,
}

/// A single listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackSummary {
    pub id: String,
    pub display_name: String,
}
