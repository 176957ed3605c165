//! User registration and attribution lookups.

use tracing::info;

use super::error::{CatalogError, CatalogResult};
use super::service::CatalogService;
use crate::model::{User, UserId, ValidationError};

impl CatalogService {
    /// Create or rename the caller's user document.
    ///
    /// Display names are unique, ignoring case.
    pub async fn register_user(
        &self,
        token: Option<&str>,
        display_name: &str,
    ) -> CatalogResult<User> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let identity = self.authenticate(token).await?;

        let folded = display_name.to_lowercase();
        let taken = self
            .store
            .list_users()
            .await?
            .into_iter()
            .any(|u| u.uid != identity.user && u.display_name.to_lowercase() == folded);
        if taken {
            return Err(CatalogError::Conflict(format!(
                "Display name {} is already taken",
                display_name
            )));
        }

        let user = User::new(identity.user, display_name);
        self.store.put_user(user.clone()).await?;
        info!(uid = %user.uid, display_name, "User registered");
        Ok(user)
    }

    /// Look a user up by uid, then by display name ignoring case.
    pub async fn get_user(&self, id: &str) -> CatalogResult<User> {
        if let Some(user) = self.store.get_user(&UserId::new(id)).await? {
            return Ok(user);
        }
        let folded = id.to_lowercase();
        self.store
            .list_users()
            .await?
            .into_iter()
            .find(|u| u.display_name.to_lowercase() == folded)
            .ok_or_else(|| CatalogError::user_not_found(id))
    }

    /// Friendly ids of the packs the user contributes to, sorted.
    pub async fn user_packs(&self, id: &str) -> CatalogResult<Vec<String>> {
        let user = self.get_user(id).await?;
        let mut ids: Vec<String> = self
            .store
            .list_packs()
            .await?
            .into_iter()
            .filter(|p| p.is_contributor(&user.uid))
            .map(|p| p.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Uids of the bundles the user owns.
    pub async fn user_bundles(&self, id: &str) -> CatalogResult<Vec<String>> {
        let user = self.get_user(id).await?;
        Ok(self
            .store
            .list_bundles()
            .await?
            .into_iter()
            .filter(|b| b.is_owner(&user.uid))
            .map(|b| b.uid)
            .collect())
    }
}
