//! `/bundles` handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use super::extract::{AuthToken, DataBody};
use crate::catalog::CatalogService;
use crate::model::{Bundle, BundleData, BundleEntry};

type ApiResult<T> = Result<T, ApiError>;

pub async fn create(
    State(service): State<Arc<CatalogService>>,
    token: AuthToken,
    body: Result<Json<DataBody<BundleData>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let uid = service.create_bundle(token.as_deref(), body.data).await?;
    Ok((StatusCode::CREATED, Json(json!({ "bundleId": uid }))))
}

pub async fn get(
    State(service): State<Arc<CatalogService>>,
    Path(uid): Path<String>,
) -> ApiResult<Json<Bundle>> {
    Ok(Json(service.get_bundle(&uid).await?))
}

pub async fn update(
    State(service): State<Arc<CatalogService>>,
    Path(uid): Path<String>,
    token: AuthToken,
    body: Result<Json<DataBody<BundleData>>, JsonRejection>,
) -> ApiResult<Json<Bundle>> {
    let Json(body) = body?;
    Ok(Json(
        service
            .update_bundle(token.as_deref(), &uid, body.data)
            .await?,
    ))
}

pub async fn delete(
    State(service): State<Arc<CatalogService>>,
    Path(uid): Path<String>,
    token: AuthToken,
) -> ApiResult<&'static str> {
    service.delete_bundle(token.as_deref(), &uid).await?;
    Ok("Deleted bundle")
}

#[derive(Deserialize)]
pub struct AddPackQuery {
    id: String,
}

pub async fn add_pack(
    State(service): State<Arc<CatalogService>>,
    Path(uid): Path<String>,
    token: AuthToken,
    query: Result<Query<AddPackQuery>, QueryRejection>,
) -> ApiResult<(StatusCode, Json<BundleEntry>)> {
    let Query(query) = query?;
    let entry = service
        .add_pack_to_bundle(token.as_deref(), &uid, &query.id)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove_pack(
    State(service): State<Arc<CatalogService>>,
    Path((uid, pack)): Path<(String, String)>,
    token: AuthToken,
) -> ApiResult<&'static str> {
    service
        .remove_pack_from_bundle(token.as_deref(), &uid, &pack)
        .await?;
    Ok("Removed pack")
}
