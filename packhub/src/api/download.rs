//! Download redirect and liveness handlers.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use crate::catalog::CatalogService;

#[derive(Deserialize)]
pub struct DownloadQuery {
    pack: String,
    version: Option<String>,
}

/// Count the download and redirect to the file.
pub async fn download(
    State(service): State<Arc<CatalogService>>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let url = service
        .record_download(&query.pack, query.version.as_deref())
        .await?;
    Ok((StatusCode::FOUND, [(LOCATION, url)]).into_response())
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}
