//! Service struct and shared helpers.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::error::{CatalogError, CatalogResult};
use crate::auth::{self, Identity, TokenVerifier};
use crate::model::{Bundle, Pack};
use crate::store::{CatalogStore, StoreError};

/// Attempts made for a read-modify-write before giving up.
pub(super) const MAX_WRITE_ATTEMPTS: usize = 3;

/// Authorization check applied to a freshly loaded pack.
pub(super) type PackCheck = fn(&Identity, &Pack) -> CatalogResult<()>;

/// Catalog business logic over a store and a token verifier.
#[derive(Clone)]
pub struct CatalogService {
    pub(super) store: Arc<dyn CatalogStore>,
    pub(super) verifier: Arc<dyn TokenVerifier>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { store, verifier }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    pub(super) async fn authenticate(&self, token: Option<&str>) -> CatalogResult<Identity> {
        auth::authenticate(self.verifier.as_ref(), token).await
    }

    /// Look a pack up by document id, then by friendly id.
    pub(super) async fn resolve_pack(&self, id: &str) -> CatalogResult<Pack> {
        if let Some(pack) = self.store.get_pack(id).await? {
            return Ok(pack);
        }
        self.store
            .find_pack(id)
            .await?
            .ok_or_else(|| CatalogError::pack_not_found(id))
    }

    pub(super) async fn load_bundle(&self, uid: &str) -> CatalogResult<Bundle> {
        self.store
            .get_bundle(uid)
            .await?
            .ok_or_else(|| CatalogError::bundle_not_found(uid))
    }

    /// Load, authorize, mutate and replace a pack, retrying on concurrent
    /// modification.
    pub(super) async fn modify_pack<F>(
        &self,
        identity: &Identity,
        id: &str,
        check: PackCheck,
        mut mutate: F,
    ) -> CatalogResult<Pack>
    where
        F: FnMut(&mut Pack) -> CatalogResult<()>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut pack = self.resolve_pack(id).await?;
            check(identity, &pack)?;
            mutate(&mut pack)?;

            match self.store.replace_pack(pack).await {
                Ok(stored) => return Ok(stored),
                Err(StoreError::RevisionMismatch { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(pack_id = id, attempt, "Pack changed during update, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Load, mutate and replace a bundle, retrying on concurrent
    /// modification. Authorization is the caller's job inside `mutate`.
    pub(super) async fn modify_bundle<F>(&self, uid: &str, mut mutate: F) -> CatalogResult<Bundle>
    where
        F: FnMut(&mut Bundle) -> CatalogResult<()>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut bundle = self.load_bundle(uid).await?;
            mutate(&mut bundle)?;

            match self.store.replace_bundle(bundle).await {
                Ok(stored) => return Ok(stored),
                Err(StoreError::RevisionMismatch { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(bundle = uid, attempt, "Bundle changed during update, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// A new document key.
pub(super) fn new_doc_id() -> String {
    Uuid::new_v4().simple().to_string()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::api::status_for;
    use crate::model::BundleData;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_pack_write_retries_after_revision_mismatch() {
        let (service, store, _) = hooked_service();
        service
            .create_pack(Some(OWNER_TOKEN), "tcc", pack_data("TCC", &[]))
            .await
            .unwrap();

        store.fail_replaces(1);
        let pack = service
            .update_pack(Some(OWNER_TOKEN), "tcc", pack_data("Renamed", &[]))
            .await
            .unwrap();
        assert_eq!(pack.data.display.name, "Renamed");
        assert_eq!(pack.revision, 1);
        assert_eq!(service.get_pack("tcc").await.unwrap().display.name, "Renamed");
    }

    #[tokio::test]
    async fn test_pack_write_gives_up_after_max_attempts() {
        let (service, store, _) = hooked_service();
        service
            .create_pack(Some(OWNER_TOKEN), "tcc", pack_data("TCC", &[]))
            .await
            .unwrap();

        store.fail_replaces(MAX_WRITE_ATTEMPTS);
        let err = service
            .update_pack(Some(OWNER_TOKEN), "tcc", pack_data("Renamed", &[]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Store(StoreError::RevisionMismatch { kind: "pack", .. })
        ));
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(service.get_pack("tcc").await.unwrap().display.name, "TCC");
    }

    #[tokio::test]
    async fn test_bundle_write_retries_after_revision_mismatch() {
        let (service, store, _) = hooked_service();
        let uid = service
            .create_bundle(Some(ALICE_TOKEN), BundleData::new("Mine", "1.19"))
            .await
            .unwrap();

        store.fail_replaces(MAX_WRITE_ATTEMPTS - 1);
        let bundle = service
            .update_bundle(Some(ALICE_TOKEN), &uid, BundleData::new("Renamed", "1.19"))
            .await
            .unwrap();
        assert_eq!(bundle.data.name, "Renamed");
        assert_eq!(bundle.revision, 1);

        store.fail_replaces(MAX_WRITE_ATTEMPTS);
        let err = service
            .update_bundle(Some(ALICE_TOKEN), &uid, BundleData::new("Lost", "1.19"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Store(StoreError::RevisionMismatch { kind: "bundle", .. })
        ));
        assert_eq!(status_for(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(service.get_bundle(&uid).await.unwrap().data.name, "Renamed");
    }
}
