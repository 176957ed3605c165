//! Pack version types.

use serde::{Deserialize, Serialize};

/// A dependency on a specific version of another pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackReference {
    /// Friendly id of the referenced pack.
    pub id: String,
    /// Version name of the referenced pack.
    pub version: String,
}

/// Download links for a version.
///
/// A version may ship a datapack, a resourcepack, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datapack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resourcepack: Option<String>,
}

impl PackDownloads {
    /// The link a plain download should redirect to.
    ///
    /// Prefers the datapack and falls back to the resourcepack.
    pub fn primary(&self) -> Option<&str> {
        self.datapack.as_deref().or(self.resourcepack.as_deref())
    }
}

/// A semver-named release of a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackVersion {
    /// Semantic version name, unique within the pack.
    pub name: String,

    /// Other packs this version requires.
    #[serde(default)]
    pub dependencies: Vec<PackReference>,

    /// Game versions this release works with (e.g. "1.19").
    #[serde(default)]
    pub supports: Vec<String>,

    /// Download links.
    #[serde(default)]
    pub downloads: PackDownloads,
}

impl PackVersion {
    /// Create a version with no dependencies or links.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            supports: Vec::new(),
            downloads: PackDownloads::default(),
        }
    }

    /// Add a supported game version.
    pub fn with_support(mut self, game_version: impl Into<String>) -> Self {
        self.supports.push(game_version.into());
        self
    }

    /// Set the datapack download link.
    pub fn with_datapack(mut self, url: impl Into<String>) -> Self {
        self.downloads.datapack = Some(url.into());
        self
    }

    /// Check whether this version lists the given game version.
    pub fn supports(&self, game_version: &str) -> bool {
        self.supports.iter().any(|s| s == game_version)
    }
}
