//! `/packs/:id/versions` handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::error::ApiError;
use super::extract::{AuthToken, DataBody};
use crate::catalog::CatalogService;
use crate::model::PackVersion;

type ApiResult<T> = Result<T, ApiError>;

/// `?version=` on create and resolve.
#[derive(Deserialize)]
pub struct VersionQuery {
    version: String,
}

pub async fn list(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<PackVersion>>> {
    Ok(Json(service.list_versions(&id).await?))
}

pub async fn create(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    token: AuthToken,
    query: Result<Query<VersionQuery>, QueryRejection>,
    body: Result<Json<DataBody<PackVersion>>, JsonRejection>,
) -> ApiResult<(StatusCode, String)> {
    let Query(query) = query?;
    let Json(body) = body?;
    let created = service
        .create_version(token.as_deref(), &id, &query.version, body.data)
        .await?;
    Ok((
        StatusCode::CREATED,
        format!("Version {} successfully created", created.name),
    ))
}

pub async fn update(
    State(service): State<Arc<CatalogService>>,
    Path((id, version)): Path<(String, String)>,
    token: AuthToken,
    body: Result<Json<DataBody<PackVersion>>, JsonRejection>,
) -> ApiResult<String> {
    let Json(body) = body?;
    service
        .update_version(token.as_deref(), &id, &version, body.data)
        .await?;
    Ok(format!("Version {} successfully updated", version))
}

pub async fn delete(
    State(service): State<Arc<CatalogService>>,
    Path((id, version)): Path<(String, String)>,
    token: AuthToken,
) -> ApiResult<String> {
    service
        .delete_version(token.as_deref(), &id, &version)
        .await?;
    Ok(format!("Version {} successfully deleted", version))
}

pub async fn latest(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PackVersion>> {
    Ok(Json(service.latest_version(&id).await?))
}

pub async fn resolve(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    query: Result<Query<VersionQuery>, QueryRejection>,
) -> ApiResult<Json<PackVersion>> {
    let Query(query) = query?;
    Ok(Json(service.resolve_version(&id, &query.version).await?))
}
