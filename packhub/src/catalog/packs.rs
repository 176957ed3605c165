//! Pack listing, creation and ownership operations.

use chrono::Utc;
use tracing::info;

use super::error::{CatalogError, CatalogResult};
use super::service::{new_doc_id, CatalogService};
use crate::auth::{require_contributor, require_owner};
use crate::model::{validate_pack_id, Pack, PackData, PackMeta, PackSummary, UserId};
use crate::search::{self, ListQuery};

impl CatalogService {
    /// One page of listed packs.
    pub async fn list_packs(&self, query: &ListQuery) -> CatalogResult<Vec<PackSummary>> {
        query.validate()?;
        let packs = self.store.list_packs().await?;
        Ok(search::list(&packs, query))
    }

    /// Number of listed packs matching the query's filters.
    pub async fn count_packs(&self, query: &ListQuery) -> CatalogResult<usize> {
        let packs = self.store.list_packs().await?;
        Ok(search::count(&packs, query))
    }

    /// Create a pack owned by the caller and return its document id.
    pub async fn create_pack(
        &self,
        token: Option<&str>,
        id: &str,
        data: PackData,
    ) -> CatalogResult<String> {
        validate_pack_id(id)?;
        data.validate()?;
        let identity = self.authenticate(token).await?;

        if self.store.find_pack(id).await?.is_some() {
            return Err(CatalogError::Conflict(format!(
                "Pack with ID {} already exists in the database",
                id
            )));
        }

        let doc_id = new_doc_id();
        let pack = Pack::new(doc_id.clone(), id, identity.user.clone(), data, Utc::now());
        self.store.insert_pack(pack).await?;

        info!(pack_id = id, doc_id = %doc_id, owner = %identity.user, "Pack created");
        Ok(doc_id)
    }

    /// The full stored pack.
    pub async fn get_pack_doc(&self, id: &str) -> CatalogResult<Pack> {
        self.resolve_pack(id).await
    }

    /// The editable data of a pack, looked up by document id then friendly id.
    pub async fn get_pack(&self, id: &str) -> CatalogResult<PackData> {
        Ok(self.resolve_pack(id).await?.data)
    }

    pub async fn pack_meta(&self, id: &str) -> CatalogResult<PackMeta> {
        Ok(self.resolve_pack(id).await?.meta())
    }

    /// Replace a pack's data. Contributors only.
    pub async fn update_pack(
        &self,
        token: Option<&str>,
        id: &str,
        data: PackData,
    ) -> CatalogResult<Pack> {
        data.validate()?;
        let identity = self.authenticate(token).await?;

        let pack = self
            .modify_pack(&identity, id, require_contributor, |pack| {
                pack.replace_data(data.clone(), Utc::now());
                Ok(())
            })
            .await?;

        info!(pack_id = %pack.id, user = %identity.user, "Pack updated");
        self.reconcile_bundles(&pack.id, Some(&pack)).await?;
        Ok(pack)
    }

    /// Delete a pack and its download counter. Owner only.
    pub async fn delete_pack(&self, token: Option<&str>, id: &str) -> CatalogResult<()> {
        let identity = self.authenticate(token).await?;
        let pack = self.resolve_pack(id).await?;
        require_owner(&identity, &pack)?;

        if !self.store.delete_pack(&pack.doc_id).await? {
            return Err(CatalogError::pack_not_found(id));
        }
        self.store.delete_counter(&pack.doc_id).await?;

        info!(pack_id = %pack.id, doc_id = %pack.doc_id, "Pack deleted");
        self.reconcile_bundles(&pack.id, None).await?;
        Ok(())
    }

    /// Add contributors. Owner only. Returns the resulting contributor list.
    pub async fn add_contributors(
        &self,
        token: Option<&str>,
        id: &str,
        users: &[UserId],
    ) -> CatalogResult<Vec<UserId>> {
        let identity = self.authenticate(token).await?;
        let mut added = 0;
        let pack = self
            .modify_pack(&identity, id, require_owner, |pack| {
                added = pack.add_contributors(users);
                Ok(())
            })
            .await?;

        info!(pack_id = %pack.id, added, "Contributors added");
        Ok(pack.contributors)
    }

    /// Remove contributors. Owner only; the owner always stays.
    pub async fn remove_contributors(
        &self,
        token: Option<&str>,
        id: &str,
        users: &[UserId],
    ) -> CatalogResult<Vec<UserId>> {
        let identity = self.authenticate(token).await?;
        let mut removed = 0;
        let pack = self
            .modify_pack(&identity, id, require_owner, |pack| {
                removed = pack.remove_contributors(users);
                Ok(())
            })
            .await?;

        info!(pack_id = %pack.id, removed, "Contributors removed");
        Ok(pack.contributors)
    }
}
