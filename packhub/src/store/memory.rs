//! In-memory store provider with JSON snapshots.
//!
//! All collections live behind a single `parking_lot::RwLock`, so every
//! operation is atomic with respect to every other. Snapshots are written to
//! a temporary file and renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use futures::future;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::analytics::DownloadCounter;
use super::traits::{BoxFuture, CatalogStore, StoreError, StoreResult};
use crate::model::{Bundle, Pack, User, UserId};

/// Serialized form of the whole store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub packs: Vec<Pack>,
    #[serde(default)]
    pub bundles: Vec<Bundle>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub analytics: Vec<DownloadCounter>,
}

#[derive(Debug, Default)]
struct Tables {
    packs: BTreeMap<String, Pack>,
    /// Friendly id -> doc id.
    pack_ids: BTreeMap<String, String>,
    bundles: BTreeMap<String, Bundle>,
    users: BTreeMap<UserId, User>,
    analytics: BTreeMap<String, DownloadCounter>,
}

impl Tables {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut tables = Tables::default();
        for pack in snapshot.packs {
            tables.pack_ids.insert(pack.id.clone(), pack.doc_id.clone());
            tables.packs.insert(pack.doc_id.clone(), pack);
        }
        for bundle in snapshot.bundles {
            tables.bundles.insert(bundle.uid.clone(), bundle);
        }
        for user in snapshot.users {
            tables.users.insert(user.uid.clone(), user);
        }
        for counter in snapshot.analytics {
            tables.analytics.insert(counter.doc_id.clone(), counter);
        }
        tables
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            packs: self.packs.values().cloned().collect(),
            bundles: self.bundles.values().cloned().collect(),
            users: self.users.values().cloned().collect(),
            analytics: self.analytics.values().cloned().collect(),
        }
    }
}

/// In-memory catalog store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            tables: RwLock::new(Tables::from_snapshot(snapshot)),
        }
    }

    /// Load a store from a snapshot file.
    ///
    /// A missing file yields an empty store.
    pub fn load_snapshot(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No snapshot found, starting with empty store");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        info!(
            path = %path.display(),
            packs = snapshot.packs.len(),
            bundles = snapshot.bundles.len(),
            users = snapshot.users.len(),
            "Loaded store snapshot"
        );

        Ok(Self::from_snapshot(snapshot))
    }

    /// Copy the current contents into a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.tables.read().to_snapshot()
    }

    /// Write the current contents to `path`.
    pub fn save_snapshot(&self, path: &Path) -> StoreResult<()> {
        let snapshot = self.snapshot();
        let content = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| StoreError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, path).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!(path = %path.display(), packs = snapshot.packs.len(), "Saved store snapshot");
        Ok(())
    }

    fn insert_pack_sync(&self, pack: Pack) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.packs.contains_key(&pack.doc_id) {
            return Err(StoreError::Conflict {
                kind: "pack",
                id: pack.doc_id,
            });
        }
        if tables.pack_ids.contains_key(&pack.id) {
            return Err(StoreError::Conflict {
                kind: "pack",
                id: pack.id,
            });
        }
        tables.pack_ids.insert(pack.id.clone(), pack.doc_id.clone());
        tables.packs.insert(pack.doc_id.clone(), pack);
        Ok(())
    }

    fn replace_pack_sync(&self, mut pack: Pack) -> StoreResult<Pack> {
        let mut tables = self.tables.write();
        let stored = tables
            .packs
            .get_mut(&pack.doc_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "pack",
                id: pack.doc_id.clone(),
            })?;
        if stored.revision != pack.revision {
            return Err(StoreError::RevisionMismatch {
                kind: "pack",
                id: pack.doc_id.clone(),
                expected: pack.revision,
                found: stored.revision,
            });
        }
        pack.revision += 1;
        *stored = pack.clone();
        Ok(pack)
    }

    fn delete_pack_sync(&self, doc_id: &str) -> bool {
        let mut tables = self.tables.write();
        match tables.packs.remove(doc_id) {
            Some(pack) => {
                tables.pack_ids.remove(&pack.id);
                true
            }
            None => false,
        }
    }

    fn insert_bundle_sync(&self, bundle: Bundle) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.bundles.contains_key(&bundle.uid) {
            return Err(StoreError::Conflict {
                kind: "bundle",
                id: bundle.uid,
            });
        }
        tables.bundles.insert(bundle.uid.clone(), bundle);
        Ok(())
    }

    fn replace_bundle_sync(&self, mut bundle: Bundle) -> StoreResult<Bundle> {
        let mut tables = self.tables.write();
        let stored = tables
            .bundles
            .get_mut(&bundle.uid)
            .ok_or_else(|| StoreError::NotFound {
                kind: "bundle",
                id: bundle.uid.clone(),
            })?;
        if stored.revision != bundle.revision {
            return Err(StoreError::RevisionMismatch {
                kind: "bundle",
                id: bundle.uid.clone(),
                expected: bundle.revision,
                found: stored.revision,
            });
        }
        bundle.revision += 1;
        *stored = bundle.clone();
        Ok(bundle)
    }
}

impl CatalogStore for MemoryStore {
    fn get_pack(&self, doc_id: &str) -> BoxFuture<'_, StoreResult<Option<Pack>>> {
        let pack = self.tables.read().packs.get(doc_id).cloned();
        Box::pin(future::ready(Ok(pack)))
    }

    fn find_pack(&self, id: &str) -> BoxFuture<'_, StoreResult<Option<Pack>>> {
        let tables = self.tables.read();
        let pack = tables
            .pack_ids
            .get(id)
            .and_then(|doc_id| tables.packs.get(doc_id))
            .cloned();
        Box::pin(future::ready(Ok(pack)))
    }

    fn list_packs(&self) -> BoxFuture<'_, StoreResult<Vec<Pack>>> {
        let packs = self.tables.read().packs.values().cloned().collect();
        Box::pin(future::ready(Ok(packs)))
    }

    fn insert_pack(&self, pack: Pack) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(future::ready(self.insert_pack_sync(pack)))
    }

    fn replace_pack(&self, pack: Pack) -> BoxFuture<'_, StoreResult<Pack>> {
        Box::pin(future::ready(self.replace_pack_sync(pack)))
    }

    fn delete_pack(&self, doc_id: &str) -> BoxFuture<'_, StoreResult<bool>> {
        Box::pin(future::ready(Ok(self.delete_pack_sync(doc_id))))
    }

    fn get_bundle(&self, uid: &str) -> BoxFuture<'_, StoreResult<Option<Bundle>>> {
        let bundle = self.tables.read().bundles.get(uid).cloned();
        Box::pin(future::ready(Ok(bundle)))
    }

    fn list_bundles(&self) -> BoxFuture<'_, StoreResult<Vec<Bundle>>> {
        let bundles = self.tables.read().bundles.values().cloned().collect();
        Box::pin(future::ready(Ok(bundles)))
    }

    fn insert_bundle(&self, bundle: Bundle) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(future::ready(self.insert_bundle_sync(bundle)))
    }

    fn replace_bundle(&self, bundle: Bundle) -> BoxFuture<'_, StoreResult<Bundle>> {
        Box::pin(future::ready(self.replace_bundle_sync(bundle)))
    }

    fn delete_bundle(&self, uid: &str) -> BoxFuture<'_, StoreResult<bool>> {
        let existed = self.tables.write().bundles.remove(uid).is_some();
        Box::pin(future::ready(Ok(existed)))
    }

    fn get_user(&self, uid: &UserId) -> BoxFuture<'_, StoreResult<Option<User>>> {
        let user = self.tables.read().users.get(uid).cloned();
        Box::pin(future::ready(Ok(user)))
    }

    fn list_users(&self) -> BoxFuture<'_, StoreResult<Vec<User>>> {
        let users = self.tables.read().users.values().cloned().collect();
        Box::pin(future::ready(Ok(users)))
    }

    fn put_user(&self, user: User) -> BoxFuture<'_, StoreResult<()>> {
        self.tables.write().users.insert(user.uid.clone(), user);
        Box::pin(future::ready(Ok(())))
    }

    fn record_downloads(
        &self,
        doc_id: &str,
        date: NaiveDate,
        count: u64,
    ) -> BoxFuture<'_, StoreResult<()>> {
        self.tables
            .write()
            .analytics
            .entry(doc_id.to_string())
            .or_insert_with(|| DownloadCounter::new(doc_id))
            .record(date, count);
        Box::pin(future::ready(Ok(())))
    }

    fn list_counters(&self) -> BoxFuture<'_, StoreResult<Vec<DownloadCounter>>> {
        let counters = self.tables.read().analytics.values().cloned().collect();
        Box::pin(future::ready(Ok(counters)))
    }

    fn delete_counter(&self, doc_id: &str) -> BoxFuture<'_, StoreResult<bool>> {
        let existed = self.tables.write().analytics.remove(doc_id).is_some();
        Box::pin(future::ready(Ok(existed)))
    }
}
