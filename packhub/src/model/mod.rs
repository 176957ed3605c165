//! Catalog data model.
//!
//! This module provides the document types persisted by the store and
//! exchanged over the REST API. All types serialize as camelCase JSON.
//!
//! # Type Hierarchy
//!
//! ```text
//! Pack (document)                    Bundle (document)
//! ├── doc_id, id, owner              ├── uid, owner
//! ├── contributors, state, stats     └── data: BundleData
//! └── data: PackData                     ├── name, version (game)
//!     ├── display: PackDisplay           └── packs: Vec<BundleEntry>
//!     ├── categories
//!     └── versions: Vec<PackVersion>
//! ```
//!
//! `PackData` and `BundleData` are the user-editable halves of each
//! document; the rest is owned by the service.

mod bundle;
mod pack;
mod user;
mod version;

pub use bundle::{Bundle, BundleData, BundleEntry};
pub use pack::{
    validate_pack_id, DownloadStats, Pack, PackData, PackDisplay, PackMeta, PackState, PackStats,
    PackSummary, ValidationError, MAX_PACK_ID_LEN,
};
pub use user::{User, UserId};
pub use version::{PackDownloads, PackReference, PackVersion};
