//! Download counting.

use chrono::Utc;
use tracing::debug;

use super::error::{CatalogError, CatalogResult};
use super::service::CatalogService;
use crate::versioning;

impl CatalogService {
    /// Count a download and return the link to redirect to.
    ///
    /// Uses the named version, or the latest one when `version` is `None`.
    /// Today's counter is keyed by the UTC date.
    pub async fn record_download(&self, id: &str, version: Option<&str>) -> CatalogResult<String> {
        let pack = self.resolve_pack(id).await?;
        let selected = match version {
            Some(name) => pack
                .data
                .version(name)
                .ok_or_else(|| CatalogError::version_not_found(name))?,
            None => versioning::latest(&pack.data.versions)
                .ok_or_else(|| CatalogError::NoVersions(pack.id.clone()))?,
        };
        let url = selected.downloads.primary().ok_or_else(|| {
            CatalogError::NotFound {
                kind: "Download for version",
                id: selected.name.clone(),
            }
        })?;
        let url = url.to_string();

        self.store
            .record_downloads(&pack.doc_id, Utc::now().date_naive(), 1)
            .await?;
        debug!(pack_id = %pack.id, version = %selected.name, "Download recorded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::super::service::test_support::*;
    use super::*;
    use crate::model::PackVersion;
    use crate::store::CatalogStore;

    #[tokio::test]
    async fn test_record_download_counts_and_returns_link() {
        let (service, store) = service();
        let doc_id = service
            .create_pack(
                Some(OWNER_TOKEN),
                "tcc",
                pack_data("TCC", &[("1.0.0", &["1.19"]), ("1.1.0", &["1.19"])]),
            )
            .await
            .unwrap();

        let url = service.record_download("tcc", None).await.unwrap();
        assert_eq!(url, "https://example.com/TCC/1.1.0.zip");
        let url = service.record_download(&doc_id, Some("1.0.0")).await.unwrap();
        assert_eq!(url, "https://example.com/TCC/1.0.0.zip");

        let counters = store.list_counters().await.unwrap();
        assert_eq!(counters.len(), 1);
        assert_eq!(counters[0].total, 2);
        assert_eq!(counters[0].on(Utc::now().date_naive()), 2);
    }

    #[tokio::test]
    async fn test_record_download_errors() {
        let (service, store) = service();
        let mut data = pack_data("TCC", &[]);
        data.versions.push(PackVersion::new("1.0.0"));
        service
            .create_pack(Some(OWNER_TOKEN), "tcc", data)
            .await
            .unwrap();

        assert!(matches!(
            service.record_download("missing", None).await,
            Err(CatalogError::NotFound { kind: "Pack", .. })
        ));
        assert!(matches!(
            service.record_download("tcc", Some("9.0.0")).await,
            Err(CatalogError::NotFound { kind: "Version", .. })
        ));
        assert!(service.record_download("tcc", None).await.is_err());
        assert!(store.list_counters().await.unwrap().is_empty());
    }
}
