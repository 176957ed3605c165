//! Typed read client for a running catalog server.

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::card::PackCard;
use super::http::{ClientError, HttpClient};
use crate::model::{PackData, PackMeta, PackSummary, PackVersion, User};
use crate::search::ListQuery;

/// Reads packs, users and versions over the `/v2` API.
pub struct CatalogClient<C: HttpClient> {
    http: C,
    base_url: String,
}

impl<C: HttpClient> CatalogClient<C> {
    /// `base_url` is the server root, e.g. `http://localhost:9000`.
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Http(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Http(format!("Invalid base URL {}", self.base_url)))?;
            path.pop_if_empty().push("v2").extend(segments);
        }
        Ok(url)
    }

    fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!(url = %url, "GET");
        let body = self.http.get(url.as_str())?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// One page of listed packs.
    pub fn list_packs(&self, query: &ListQuery) -> Result<Vec<PackSummary>, ClientError> {
        let mut url = self.endpoint(&["packs"])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(search) = &query.search {
                pairs.append_pair("search", search);
            }
            pairs
                .append_pair("sort", query.sort.as_str())
                .append_pair("limit", &query.limit.to_string())
                .append_pair("start", &query.start.to_string());
            for category in &query.categories {
                pairs.append_pair("category", category);
            }
        }
        self.fetch(url)
    }

    pub fn pack(&self, id: &str) -> Result<PackData, ClientError> {
        self.fetch(self.endpoint(&["packs", id])?)
    }

    pub fn meta(&self, id: &str) -> Result<PackMeta, ClientError> {
        self.fetch(self.endpoint(&["packs", id, "meta"])?)
    }

    pub fn user(&self, id: &str) -> Result<User, ClientError> {
        self.fetch(self.endpoint(&["users", id])?)
    }

    pub fn latest_version(&self, id: &str) -> Result<PackVersion, ClientError> {
        self.fetch(self.endpoint(&["packs", id, "versions", "latest"])?)
    }

    /// Everything needed to show a pack card.
    ///
    /// A missing owner document shows the raw uid. A pack without versions
    /// has no latest version.
    pub fn pack_card(&self, id: &str) -> Result<PackCard, ClientError> {
        let meta = self.meta(id)?;
        let data = self.pack(id)?;

        let author = match self.user(meta.owner.as_str()) {
            Ok(user) => user.display_name,
            Err(e) if e.is_not_found() => meta.owner.to_string(),
            Err(e) => return Err(e),
        };
        let latest = match self.latest_version(id) {
            Ok(version) => Some(version.name),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        Ok(PackCard::new(&data, author, meta.stats.downloads.total, latest))
    }
}
