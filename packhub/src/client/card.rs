//! Pack card view.

use std::fmt;

use crate::format::downloads_label;
use crate::model::PackData;

/// What a listing shows for one pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    /// Owner display name.
    pub author: String,
    pub downloads: u64,
    pub latest_version: Option<String>,
}

impl PackCard {
    pub fn new(
        data: &PackData,
        author: impl Into<String>,
        downloads: u64,
        latest_version: Option<String>,
    ) -> Self {
        Self {
            id: data.id.clone(),
            name: data.display.name.clone(),
            description: data.display.description.clone(),
            icon: data.display.icon.clone(),
            author: author.into(),
            downloads,
            latest_version,
        }
    }
}

impl fmt::Display for PackCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} by {}", self.name, self.author)?;
        if !self.description.is_empty() {
            writeln!(f, "  {}", self.description)?;
        }
        write!(f, "  {}", downloads_label(self.downloads))?;
        if let Some(version) = &self.latest_version {
            write!(f, " | latest {}", version)?;
        }
        Ok(())
    }
}
