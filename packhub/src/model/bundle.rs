//! Bundle document types.

use serde::{Deserialize, Serialize};

use super::pack::ValidationError;
use super::user::UserId;

/// A pack selection inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    /// Friendly pack id.
    pub id: String,
    /// Selected version name.
    pub version: String,
}

impl BundleEntry {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

/// The user-editable half of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleData {
    pub name: String,
    /// Target game version every entry must support.
    pub version: String,
    #[serde(default)]
    pub packs: Vec<BundleEntry>,
}

impl BundleData {
    pub fn new(name: impl Into<String>, game_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: game_version.into(),
            packs: Vec::new(),
        }
    }

    /// Validate the fields that do not need a store lookup.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyBundleName);
        }
        if self.version.trim().is_empty() {
            return Err(ValidationError::EmptyGameVersion);
        }
        Ok(())
    }

    pub fn contains(&self, pack_id: &str) -> bool {
        self.packs.iter().any(|p| p.id == pack_id)
    }
}

/// A stored bundle document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub uid: String,
    pub owner: UserId,
    pub data: BundleData,
    #[serde(default)]
    pub revision: u64,
}

impl Bundle {
    pub fn new(uid: impl Into<String>, owner: UserId, data: BundleData) -> Self {
        Self {
            uid: uid.into(),
            owner,
            data,
            revision: 0,
        }
    }

    pub fn is_owner(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}
