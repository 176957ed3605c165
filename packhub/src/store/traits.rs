//! Core storage trait.
//!
//! # Dyn Compatibility
//!
//! Async methods return `Pin<Box<dyn Future>>` so the service can hold an
//! `Arc<dyn CatalogStore>` and tests can swap in any provider.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;

use chrono::NaiveDate;
use thiserror::Error;

use super::analytics::DownloadCounter;
use crate::model::{Bundle, Pack, User, UserId};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// A document with the same unique key already exists.
    #[error("{kind} '{id}' already exists")]
    Conflict { kind: &'static str, id: String },

    /// The document changed since it was read.
    #[error("{kind} '{id}' was modified concurrently (expected revision {expected}, found {found})")]
    RevisionMismatch {
        kind: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },

    /// Snapshot file I/O failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot could not be encoded or decoded.
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Storage interface for catalog documents.
///
/// All implementations must be `Send + Sync` for use across request handlers
/// and the metrics daemon.
pub trait CatalogStore: Send + Sync {
    // ---- packs ----

    /// Get a pack by document id.
    fn get_pack(&self, doc_id: &str) -> BoxFuture<'_, StoreResult<Option<Pack>>>;

    /// Get a pack by friendly id.
    fn find_pack(&self, id: &str) -> BoxFuture<'_, StoreResult<Option<Pack>>>;

    /// All packs, in document id order.
    fn list_packs(&self) -> BoxFuture<'_, StoreResult<Vec<Pack>>>;

    /// Insert a new pack.
    ///
    /// Fails with [`StoreError::Conflict`] if the doc id or friendly id is
    /// taken.
    fn insert_pack(&self, pack: Pack) -> BoxFuture<'_, StoreResult<()>>;

    /// Replace a pack if `pack.revision` matches the stored revision.
    ///
    /// Returns the stored document with its new revision.
    fn replace_pack(&self, pack: Pack) -> BoxFuture<'_, StoreResult<Pack>>;

    /// Delete a pack. Returns `false` if it did not exist.
    fn delete_pack(&self, doc_id: &str) -> BoxFuture<'_, StoreResult<bool>>;

    // ---- bundles ----

    fn get_bundle(&self, uid: &str) -> BoxFuture<'_, StoreResult<Option<Bundle>>>;

    fn list_bundles(&self) -> BoxFuture<'_, StoreResult<Vec<Bundle>>>;

    fn insert_bundle(&self, bundle: Bundle) -> BoxFuture<'_, StoreResult<()>>;

    /// Replace a bundle if `bundle.revision` matches the stored revision.
    fn replace_bundle(&self, bundle: Bundle) -> BoxFuture<'_, StoreResult<Bundle>>;

    fn delete_bundle(&self, uid: &str) -> BoxFuture<'_, StoreResult<bool>>;

    // ---- users ----

    fn get_user(&self, uid: &UserId) -> BoxFuture<'_, StoreResult<Option<User>>>;

    fn list_users(&self) -> BoxFuture<'_, StoreResult<Vec<User>>>;

    /// Insert or overwrite a user document.
    fn put_user(&self, user: User) -> BoxFuture<'_, StoreResult<()>>;

    // ---- analytics ----

    /// Add `count` downloads to a pack's counter for `date` and to its total.
    fn record_downloads(
        &self,
        doc_id: &str,
        date: NaiveDate,
        count: u64,
    ) -> BoxFuture<'_, StoreResult<()>>;

    fn list_counters(&self) -> BoxFuture<'_, StoreResult<Vec<DownloadCounter>>>;

    fn delete_counter(&self, doc_id: &str) -> BoxFuture<'_, StoreResult<bool>>;
}
