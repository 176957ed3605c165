//! Version operations on a pack.

use chrono::Utc;
use tracing::info;

use super::error::{CatalogError, CatalogResult};
use super::service::CatalogService;
use crate::auth::require_contributor;
use crate::model::PackVersion;
use crate::versioning;

impl CatalogService {
    pub async fn list_versions(&self, id: &str) -> CatalogResult<Vec<PackVersion>> {
        Ok(self.resolve_pack(id).await?.data.versions)
    }

    /// Append a version. The stored name is always `name`.
    pub async fn create_version(
        &self,
        token: Option<&str>,
        id: &str,
        name: &str,
        version: PackVersion,
    ) -> CatalogResult<PackVersion> {
        if !versioning::is_valid_version(name) {
            return Err(CatalogError::InvalidVersion(name.to_string()));
        }
        let identity = self.authenticate(token).await?;

        let mut version = version;
        version.name = name.to_string();

        let pack = self
            .modify_pack(&identity, id, require_contributor, |pack| {
                if pack.data.version(name).is_some() {
                    return Err(CatalogError::Conflict(format!(
                        "Version with ID {} already exists",
                        name
                    )));
                }
                pack.data.versions.push(version.clone());
                pack.stats.updated = Utc::now();
                Ok(())
            })
            .await?;

        info!(pack_id = %pack.id, version = name, user = %identity.user, "Version created");
        Ok(version)
    }

    /// Replace an existing version in place, keeping its name.
    pub async fn update_version(
        &self,
        token: Option<&str>,
        id: &str,
        name: &str,
        version: PackVersion,
    ) -> CatalogResult<PackVersion> {
        let identity = self.authenticate(token).await?;

        let mut version = version;
        version.name = name.to_string();

        let pack = self
            .modify_pack(&identity, id, require_contributor, |pack| {
                let slot = pack
                    .data
                    .versions
                    .iter_mut()
                    .find(|v| v.name == name)
                    .ok_or_else(|| CatalogError::version_not_found(name))?;
                *slot = version.clone();
                pack.stats.updated = Utc::now();
                Ok(())
            })
            .await?;

        info!(pack_id = %pack.id, version = name, user = %identity.user, "Version updated");
        self.reconcile_bundles(&pack.id, Some(&pack)).await?;
        Ok(version)
    }

    pub async fn delete_version(
        &self,
        token: Option<&str>,
        id: &str,
        name: &str,
    ) -> CatalogResult<()> {
        let identity = self.authenticate(token).await?;

        let pack = self
            .modify_pack(&identity, id, require_contributor, |pack| {
                let before = pack.data.versions.len();
                pack.data.versions.retain(|v| v.name != name);
                if pack.data.versions.len() == before {
                    return Err(CatalogError::version_not_found(name));
                }
                pack.stats.updated = Utc::now();
                Ok(())
            })
            .await?;

        info!(pack_id = %pack.id, version = name, user = %identity.user, "Version deleted");
        self.reconcile_bundles(&pack.id, Some(&pack)).await?;
        Ok(())
    }

    /// The version with the highest semver precedence.
    pub async fn latest_version(&self, id: &str) -> CatalogResult<PackVersion> {
        let pack = self.resolve_pack(id).await?;
        versioning::latest(&pack.data.versions)
            .cloned()
            .ok_or(CatalogError::NoVersions(pack.id))
    }

    /// The highest version supporting `game_version`.
    pub async fn resolve_version(&self, id: &str, game_version: &str) -> CatalogResult<PackVersion> {
        let pack = self.resolve_pack(id).await?;
        versioning::resolve_for_game(&pack.data.versions, game_version)
            .cloned()
            .ok_or_else(|| CatalogError::NoCompatibleVersion {
                pack: pack.id.clone(),
                game_version: game_version.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::super::service::test_support::*;
    use super::*;
    use crate::model::UserId;

    async fn seeded() -> CatalogService {
        let (service, _) = service();
        service
            .create_pack(
                Some(OWNER_TOKEN),
                "tcc",
                pack_data("TCC", &[("1.0.0", &["1.18"]), ("1.2.0", &["1.19"])]),
            )
            .await
            .unwrap();
        service
            .add_contributors(Some(OWNER_TOKEN), "tcc", &[UserId::new("alice")])
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_create_version_uses_path_name() {
        let service = seeded().await;
        let created = service
            .create_version(
                Some(ALICE_TOKEN),
                "tcc",
                "2.0.0",
                PackVersion::new("ignored").with_support("1.20"),
            )
            .await
            .unwrap();
        assert_eq!(created.name, "2.0.0");

        let names: Vec<_> = service
            .list_versions("tcc")
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["1.0.0", "1.2.0", "2.0.0"]);
    }

    #[tokio::test]
    async fn test_create_version_rejects_bad_semver_before_auth() {
        let service = seeded().await;
        let err = service
            .create_version(None, "tcc", "1.0", PackVersion::new("1.0"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Version ID 1.0 is not valid semver. Reference: https://semver.org"
        );
    }

    #[tokio::test]
    async fn test_create_version_conflict_and_forbidden() {
        let service = seeded().await;
        let err = service
            .create_version(Some(OWNER_TOKEN), "tcc", "1.0.0", PackVersion::new("1.0.0"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Version with ID 1.0.0 already exists");

        let err = service
            .create_version(Some(BOB_TOKEN), "tcc", "3.0.0", PackVersion::new("3.0.0"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));
        assert_eq!(service.list_versions("tcc").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_version_is_not_found() {
        let service = seeded().await;
        let err = service
            .update_version(Some(ALICE_TOKEN), "tcc", "9.9.9", PackVersion::new("9.9.9"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { kind: "Version", .. }));

        let err = service
            .delete_version(Some(ALICE_TOKEN), "tcc", "9.9.9")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_version_replaces_in_place() {
        let service = seeded().await;
        service
            .update_version(
                Some(ALICE_TOKEN),
                "tcc",
                "1.0.0",
                PackVersion::new("5.0.0").with_support("1.17"),
            )
            .await
            .unwrap();
        let versions = service.list_versions("tcc").await.unwrap();
        assert_eq!(versions[0].name, "1.0.0");
        assert_eq!(versions[0].supports, vec!["1.17"]);
    }

    #[tokio::test]
    async fn test_latest_and_resolve() {
        let service = seeded().await;
        assert_eq!(service.latest_version("tcc").await.unwrap().name, "1.2.0");
        assert_eq!(
            service.resolve_version("tcc", "1.18").await.unwrap().name,
            "1.0.0"
        );

        let err = service.resolve_version("tcc", "1.12").await.unwrap_err();
        assert!(matches!(err, CatalogError::NoCompatibleVersion { .. }));

        service
            .delete_version(Some(OWNER_TOKEN), "tcc", "1.0.0")
            .await
            .unwrap();
        service
            .delete_version(Some(OWNER_TOKEN), "tcc", "1.2.0")
            .await
            .unwrap();
        let err = service.latest_version("tcc").await.unwrap_err();
        assert!(matches!(err, CatalogError::NoVersions(_)));
    }
}
