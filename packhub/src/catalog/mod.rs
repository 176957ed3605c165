//! Catalog operations.
//!
//! [`CatalogService`] implements every read and mutation the API exposes.
//! Mutations follow one sequence:
//!
//! ```text
//! validate input ─► authenticate token ─► load document ─► authorize ─► mutate ─► replace
//!                                               ▲                                    │
//!                                               └──── RevisionMismatch (retry) ──────┘
//! ```
//!
//! Nothing is written until every check has passed.
//!
//! # Bundle consistency
//!
//! Bundle entries must point at a version that supports the bundle's game
//! version. When a pack is deleted, or its versions change, every bundle that
//! selects it is reconciled: entries are moved to the best remaining
//! compatible version, or dropped when none is left.

mod bundles;
mod downloads;
mod error;
mod packs;
mod service;
mod users;
mod versions;

pub use error::{CatalogError, CatalogResult};
pub use service::CatalogService;
