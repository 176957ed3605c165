//! Document storage for the catalog.
//!
//! The catalog is persisted in a document database. This module defines the
//! [`CatalogStore`] interface the service talks to and an in-process
//! [`MemoryStore`] provider with JSON snapshot persistence.
//!
//! # Collections
//!
//! | Collection | Key | Document |
//! |------------|-----|----------|
//! | packs      | doc id (friendly id indexed) | [`Pack`](crate::model::Pack) |
//! | bundles    | uid | [`Bundle`](crate::model::Bundle) |
//! | users      | uid | [`User`](crate::model::User) |
//! | analytics  | pack doc id | [`DownloadCounter`] |
//!
//! # Concurrency
//!
//! Pack and bundle documents carry a `revision`. `replace_*` succeeds only if
//! the caller's revision matches the stored one, and bumps it. Callers
//! re-read and retry on [`StoreError::RevisionMismatch`].

mod analytics;
mod memory;
mod traits;

pub use analytics::DownloadCounter;
pub use memory::{MemoryStore, Snapshot};
pub use traits::{BoxFuture, CatalogStore, StoreError, StoreResult};
