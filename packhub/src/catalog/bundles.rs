//! Bundle operations and bundle reconciliation.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::error::{CatalogError, CatalogResult};
use super::service::{new_doc_id, CatalogService};
use crate::auth::require_bundle_owner;
use crate::model::{Bundle, BundleData, BundleEntry, Pack};
use crate::versioning;

impl CatalogService {
    /// Create a bundle owned by the caller and return its uid.
    pub async fn create_bundle(
        &self,
        token: Option<&str>,
        data: BundleData,
    ) -> CatalogResult<String> {
        data.validate()?;
        let identity = self.authenticate(token).await?;
        let (data, chosen) = self.checked_entries(data).await?;

        let uid = new_doc_id();
        let bundle = Bundle::new(uid.clone(), identity.user.clone(), data);
        self.store.insert_bundle(bundle).await?;
        self.settle_entries(&chosen).await?;

        info!(bundle = %uid, owner = %identity.user, "Bundle created");
        Ok(uid)
    }

    pub async fn get_bundle(&self, uid: &str) -> CatalogResult<Bundle> {
        self.load_bundle(uid).await
    }

    /// Replace a bundle's data. Owner only.
    pub async fn update_bundle(
        &self,
        token: Option<&str>,
        uid: &str,
        data: BundleData,
    ) -> CatalogResult<Bundle> {
        data.validate()?;
        let identity = self.authenticate(token).await?;
        require_bundle_owner(&identity, &self.load_bundle(uid).await?)?;
        let (data, chosen) = self.checked_entries(data).await?;

        let mut bundle = self
            .modify_bundle(uid, |bundle| {
                require_bundle_owner(&identity, bundle)?;
                bundle.data = data.clone();
                Ok(())
            })
            .await?;
        if self.settle_entries(&chosen).await? {
            bundle = self.load_bundle(uid).await?;
        }

        info!(bundle = uid, packs = bundle.data.packs.len(), "Bundle updated");
        Ok(bundle)
    }

    pub async fn delete_bundle(&self, token: Option<&str>, uid: &str) -> CatalogResult<()> {
        let identity = self.authenticate(token).await?;
        let bundle = self.load_bundle(uid).await?;
        require_bundle_owner(&identity, &bundle)?;

        if !self.store.delete_bundle(uid).await? {
            return Err(CatalogError::bundle_not_found(uid));
        }
        info!(bundle = uid, "Bundle deleted");
        Ok(())
    }

    /// Add a pack at the highest version supporting the bundle's game version.
    pub async fn add_pack_to_bundle(
        &self,
        token: Option<&str>,
        uid: &str,
        pack_id: &str,
    ) -> CatalogResult<BundleEntry> {
        let identity = self.authenticate(token).await?;
        let pack = self.resolve_pack(pack_id).await?;
        let chosen = [ChosenPack::of(&pack)];
        let mut entry = None;

        let bundle = self
            .modify_bundle(uid, |bundle| {
                require_bundle_owner(&identity, bundle)?;
                if bundle.data.contains(&pack.id) {
                    return Err(CatalogError::Conflict(format!(
                        "Pack {} is already in bundle {}",
                        pack.id, bundle.uid
                    )));
                }
                let game_version = &bundle.data.version;
                let version = versioning::resolve_for_game(&pack.data.versions, game_version)
                    .ok_or_else(|| CatalogError::NoCompatibleVersion {
                        pack: pack.id.clone(),
                        game_version: game_version.clone(),
                    })?;
                let added = BundleEntry::new(pack.id.clone(), version.name.clone());
                bundle.data.packs.push(added.clone());
                entry = Some(added);
                Ok(())
            })
            .await?;

        let mut entry = entry.ok_or_else(|| CatalogError::pack_not_found(pack_id))?;
        if self.settle_entries(&chosen).await? {
            let settled = self.load_bundle(uid).await?;
            entry = match settled.data.packs.into_iter().find(|e| e.id == pack.id) {
                Some(entry) => entry,
                None if self.store.get_pack(&pack.doc_id).await?.is_none() => {
                    return Err(CatalogError::pack_not_found(pack_id));
                }
                None => {
                    return Err(CatalogError::NoCompatibleVersion {
                        pack: pack.id.clone(),
                        game_version: settled.data.version,
                    });
                }
            };
        }
        info!(bundle = %bundle.uid, pack_id = %entry.id, version = %entry.version, "Pack added to bundle");
        Ok(entry)
    }

    pub async fn remove_pack_from_bundle(
        &self,
        token: Option<&str>,
        uid: &str,
        pack_id: &str,
    ) -> CatalogResult<()> {
        let identity = self.authenticate(token).await?;

        self.modify_bundle(uid, |bundle| {
            require_bundle_owner(&identity, bundle)?;
            let before = bundle.data.packs.len();
            bundle.data.packs.retain(|p| p.id != pack_id);
            if bundle.data.packs.len() == before {
                return Err(CatalogError::pack_not_found(pack_id));
            }
            Ok(())
        })
        .await?;

        info!(bundle = uid, pack_id, "Pack removed from bundle");
        Ok(())
    }

    /// Check every entry against the store and normalize pack ids to
    /// friendly ids. Also returns the pack revisions the entries were
    /// checked against.
    async fn checked_entries(
        &self,
        mut data: BundleData,
    ) -> CatalogResult<(BundleData, Vec<ChosenPack>)> {
        let mut seen = HashSet::new();
        let mut chosen = Vec::with_capacity(data.packs.len());
        for entry in data.packs.iter_mut() {
            let pack = self.resolve_pack(&entry.id).await?;
            let version = pack
                .data
                .version(&entry.version)
                .ok_or_else(|| CatalogError::version_not_found(&entry.version))?;
            if !version.supports(&data.version) {
                return Err(CatalogError::NoCompatibleVersion {
                    pack: pack.id.clone(),
                    game_version: data.version.clone(),
                });
            }
            if !seen.insert(pack.id.clone()) {
                return Err(CatalogError::BadRequest(format!(
                    "Pack {} appears more than once in the bundle",
                    pack.id
                )));
            }
            chosen.push(ChosenPack::of(&pack));
            entry.id = pack.id;
        }
        Ok((data, chosen))
    }

    /// Re-read the packs entries were chosen from after a bundle write.
    ///
    /// A pack changed in between may already have reconciled its bundles
    /// without seeing this write, so reconcile again against its current
    /// state. Returns whether any bundle changed.
    async fn settle_entries(&self, chosen: &[ChosenPack]) -> CatalogResult<bool> {
        let mut changed = false;
        for choice in chosen {
            let current = self.store.get_pack(&choice.doc_id).await?;
            if current.as_ref().map(|p| p.revision) == Some(choice.revision) {
                continue;
            }
            debug!(pack_id = %choice.id, revision = choice.revision, "Pack changed during bundle write");
            changed |= self.reconcile_bundles(&choice.id, current.as_ref()).await? > 0;
        }
        Ok(changed)
    }

    /// Bring every bundle that selects `pack_id` back in line with the pack.
    ///
    /// Entries whose version still exists and supports the bundle's game
    /// version are kept. Others move to the best compatible version, or are
    /// dropped when there is none. `None` means the pack was deleted.
    pub(super) async fn reconcile_bundles(
        &self,
        pack_id: &str,
        pack: Option<&Pack>,
    ) -> CatalogResult<usize> {
        let mut changed = 0;
        for bundle in self.store.list_bundles().await? {
            if !bundle.data.contains(pack_id) {
                continue;
            }
            let needs_change = bundle
                .data
                .packs
                .iter()
                .filter(|e| e.id == pack_id)
                .any(|e| reconciled(e, pack, &bundle.data.version).as_ref() != Some(e));
            if !needs_change {
                continue;
            }

            let result = self
                .modify_bundle(&bundle.uid, |bundle| {
                    let game_version = bundle.data.version.clone();
                    bundle.data.packs = bundle
                        .data
                        .packs
                        .iter()
                        .filter_map(|e| {
                            if e.id == pack_id {
                                reconciled(e, pack, &game_version)
                            } else {
                                Some(e.clone())
                            }
                        })
                        .collect();
                    Ok(())
                })
                .await;

            match result {
                Ok(_) => {
                    info!(bundle = %bundle.uid, pack_id, "Bundle reconciled");
                    changed += 1;
                }
                Err(CatalogError::NotFound { .. }) => {}
                Err(e) => {
                    warn!(bundle = %bundle.uid, pack_id, error = %e, "Bundle reconciliation failed");
                    return Err(e);
                }
            }
        }
        Ok(changed)
    }
}

/// The pack revision a bundle entry was chosen from.
struct ChosenPack {
    doc_id: String,
    id: String,
    revision: u64,
}

impl ChosenPack {
    fn of(pack: &Pack) -> Self {
        Self {
            doc_id: pack.doc_id.clone(),
            id: pack.id.clone(),
            revision: pack.revision,
        }
    }
}

/// The entry after reconciling it against the current pack, or `None` to
/// drop it.
fn reconciled(entry: &BundleEntry, pack: Option<&Pack>, game_version: &str) -> Option<BundleEntry> {
    let pack = pack?;
    if let Some(current) = pack.data.version(&entry.version) {
        if current.supports(game_version) {
            return Some(entry.clone());
        }
    }
    versioning::resolve_for_game(&pack.data.versions, game_version)
        .map(|v| BundleEntry::new(pack.id.clone(), v.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::super::service::test_support::*;
    use super::*;
    use crate::model::PackVersion;

    async fn seeded() -> CatalogService {
        let (service, _) = service();
        service
            .create_pack(
                Some(OWNER_TOKEN),
                "tcc",
                pack_data(
                    "TCC",
                    &[
                        ("1.0.0", &["1.18", "1.19"]),
                        ("1.1.0", &["1.19"]),
                        ("2.0.0", &["1.20"]),
                    ],
                ),
            )
            .await
            .unwrap();
        service
            .create_pack(
                Some(OWNER_TOKEN),
                "old",
                pack_data("Old", &[("0.1.0", &["1.12"])]),
            )
            .await
            .unwrap();
        service
    }

    async fn bundle(service: &CatalogService, game_version: &str) -> String {
        service
            .create_bundle(Some(ALICE_TOKEN), BundleData::new("Alice's Bundle", game_version))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_pack_picks_highest_supporting_version() {
        let service = seeded().await;
        let uid = bundle(&service, "1.19").await;

        let entry = service
            .add_pack_to_bundle(Some(ALICE_TOKEN), &uid, "tcc")
            .await
            .unwrap();
        assert_eq!(entry, BundleEntry::new("tcc", "1.1.0"));

        let err = service
            .add_pack_to_bundle(Some(ALICE_TOKEN), &uid, "tcc")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));

        let err = service
            .add_pack_to_bundle(Some(ALICE_TOKEN), &uid, "old")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NoCompatibleVersion { .. }));

        let bundle = service.get_bundle(&uid).await.unwrap();
        assert_eq!(bundle.data.packs, vec![BundleEntry::new("tcc", "1.1.0")]);
    }

    #[tokio::test]
    async fn test_bundle_mutations_are_owner_only() {
        let service = seeded().await;
        let uid = bundle(&service, "1.19").await;

        let err = service
            .add_pack_to_bundle(Some(BOB_TOKEN), &uid, "tcc")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));

        let err = service.delete_bundle(Some(BOB_TOKEN), &uid).await.unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));

        let err = service.delete_bundle(None, &uid).await.unwrap_err();
        assert!(matches!(err, CatalogError::Unauthorized));

        service.delete_bundle(Some(ALICE_TOKEN), &uid).await.unwrap();
        assert!(matches!(
            service.get_bundle(&uid).await,
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_bundle_validates_entries() {
        let service = seeded().await;
        let uid = bundle(&service, "1.19").await;

        let mut data = BundleData::new("Renamed", "1.19");
        data.packs.push(BundleEntry::new("tcc", "2.0.0"));
        let err = service
            .update_bundle(Some(ALICE_TOKEN), &uid, data)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NoCompatibleVersion { .. }));

        let mut data = BundleData::new("Renamed", "1.19");
        data.packs.push(BundleEntry::new("tcc", "3.0.0"));
        let err = service
            .update_bundle(Some(ALICE_TOKEN), &uid, data)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { kind: "Version", .. }));

        let mut data = BundleData::new("Renamed", "1.19");
        data.packs.push(BundleEntry::new("tcc", "1.0.0"));
        let bundle = service
            .update_bundle(Some(ALICE_TOKEN), &uid, data)
            .await
            .unwrap();
        assert_eq!(bundle.data.name, "Renamed");
        assert_eq!(bundle.data.packs, vec![BundleEntry::new("tcc", "1.0.0")]);
    }

    #[tokio::test]
    async fn test_create_bundle_rejects_duplicate_entries() {
        let service = seeded().await;
        let mut data = BundleData::new("Dupes", "1.19");
        data.packs.push(BundleEntry::new("tcc", "1.0.0"));
        data.packs.push(BundleEntry::new("tcc", "1.1.0"));
        let err = service
            .create_bundle(Some(ALICE_TOKEN), data)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_remove_pack_from_bundle() {
        let service = seeded().await;
        let uid = bundle(&service, "1.19").await;
        service
            .add_pack_to_bundle(Some(ALICE_TOKEN), &uid, "tcc")
            .await
            .unwrap();

        service
            .remove_pack_from_bundle(Some(ALICE_TOKEN), &uid, "tcc")
            .await
            .unwrap();
        let err = service
            .remove_pack_from_bundle(Some(ALICE_TOKEN), &uid, "tcc")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deleting_version_moves_bundle_entry() {
        let service = seeded().await;
        let uid = bundle(&service, "1.19").await;
        service
            .add_pack_to_bundle(Some(ALICE_TOKEN), &uid, "tcc")
            .await
            .unwrap();

        service
            .delete_version(Some(OWNER_TOKEN), "tcc", "1.1.0")
            .await
            .unwrap();
        let bundle = service.get_bundle(&uid).await.unwrap();
        assert_eq!(bundle.data.packs, vec![BundleEntry::new("tcc", "1.0.0")]);

        service
            .update_version(
                Some(OWNER_TOKEN),
                "tcc",
                "1.0.0",
                PackVersion::new("1.0.0").with_support("1.18"),
            )
            .await
            .unwrap();
        let bundle = service.get_bundle(&uid).await.unwrap();
        assert!(bundle.data.packs.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_pack_removes_bundle_entries() {
        let service = seeded().await;
        let uid = bundle(&service, "1.19").await;
        service
            .add_pack_to_bundle(Some(ALICE_TOKEN), &uid, "tcc")
            .await
            .unwrap();

        service.delete_pack(Some(OWNER_TOKEN), "tcc").await.unwrap();
        let bundle = service.get_bundle(&uid).await.unwrap();
        assert!(bundle.data.packs.is_empty());
    }

    #[tokio::test]
    async fn test_updating_pack_reconciles_bundles() {
        let service = seeded().await;
        let uid = bundle(&service, "1.19").await;
        service
            .add_pack_to_bundle(Some(ALICE_TOKEN), &uid, "tcc")
            .await
            .unwrap();

        let narrowed = pack_data("TCC", &[("1.0.0", &["1.19"]), ("1.1.0", &["1.20"])]);
        service
            .update_pack(Some(OWNER_TOKEN), "tcc", narrowed)
            .await
            .unwrap();
        let bundle = service.get_bundle(&uid).await.unwrap();
        assert_eq!(bundle.data.packs, vec![BundleEntry::new("tcc", "1.0.0")]);

        service
            .update_pack(Some(OWNER_TOKEN), "tcc", pack_data("TCC", &[("1.0.0", &["1.20"])]))
            .await
            .unwrap();
        let bundle = service.get_bundle(&uid).await.unwrap();
        assert!(bundle.data.packs.is_empty());
    }

    async fn two_version_pack(service: &CatalogService) {
        service
            .create_pack(
                Some(OWNER_TOKEN),
                "tcc",
                pack_data("TCC", &[("0.9.0", &["1.19"]), ("1.0.0", &["1.19"])]),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_version_deleted_while_adding_pack() {
        let (service, store, direct) = hooked_service();
        two_version_pack(&service).await;
        let uid = bundle(&service, "1.19").await;

        store.before("get_bundle", async move {
            direct
                .delete_version(Some(OWNER_TOKEN), "tcc", "1.0.0")
                .await
                .unwrap();
        });
        let entry = service
            .add_pack_to_bundle(Some(ALICE_TOKEN), &uid, "tcc")
            .await
            .unwrap();

        assert_eq!(entry, BundleEntry::new("tcc", "0.9.0"));
        let bundle = service.get_bundle(&uid).await.unwrap();
        assert_eq!(bundle.data.packs, vec![BundleEntry::new("tcc", "0.9.0")]);
    }

    #[tokio::test]
    async fn test_version_deleted_while_creating_bundle() {
        let (service, store, direct) = hooked_service();
        two_version_pack(&service).await;

        store.before("insert_bundle", async move {
            direct
                .delete_version(Some(OWNER_TOKEN), "tcc", "1.0.0")
                .await
                .unwrap();
        });
        let mut data = BundleData::new("Racy", "1.19");
        data.packs.push(BundleEntry::new("tcc", "1.0.0"));
        let uid = service.create_bundle(Some(ALICE_TOKEN), data).await.unwrap();

        let bundle = service.get_bundle(&uid).await.unwrap();
        assert_eq!(bundle.data.packs, vec![BundleEntry::new("tcc", "0.9.0")]);
    }

    #[tokio::test]
    async fn test_pack_deleted_while_updating_bundle() {
        let (service, store, direct) = hooked_service();
        two_version_pack(&service).await;
        let uid = bundle(&service, "1.19").await;

        store.before("replace_bundle", async move {
            direct.delete_pack(Some(OWNER_TOKEN), "tcc").await.unwrap();
        });
        let mut data = BundleData::new("Racy", "1.19");
        data.packs.push(BundleEntry::new("tcc", "1.0.0"));
        let bundle = service
            .update_bundle(Some(ALICE_TOKEN), &uid, data)
            .await
            .unwrap();

        assert_eq!(bundle.data.name, "Racy");
        assert!(bundle.data.packs.is_empty());
        assert!(service.get_bundle(&uid).await.unwrap().data.packs.is_empty());
    }
}
