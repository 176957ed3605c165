//! `/packs` handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use super::extract::{query_pairs, repeated, AuthToken, DataBody};
use crate::catalog::{CatalogError, CatalogService};
use crate::model::{PackData, PackMeta, PackSummary, UserId};
use crate::search::ListQuery;

type ApiResult<T> = Result<T, ApiError>;

fn list_query(uri: &Uri) -> ApiResult<ListQuery> {
    let pairs = query_pairs(uri)?;
    let query = ListQuery::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    Ok(query)
}

pub async fn list(
    State(service): State<Arc<CatalogService>>,
    uri: Uri,
) -> ApiResult<Json<Vec<PackSummary>>> {
    let query = list_query(&uri)?;
    Ok(Json(service.list_packs(&query).await?))
}

pub async fn count(
    State(service): State<Arc<CatalogService>>,
    uri: Uri,
) -> ApiResult<impl IntoResponse> {
    let query = list_query(&uri)?;
    let count = service.count_packs(&query).await?;
    Ok(Json(json!({ "count": count })))
}

#[derive(Deserialize)]
pub struct CreateQuery {
    id: String,
}

pub async fn create(
    State(service): State<Arc<CatalogService>>,
    token: AuthToken,
    query: Result<Query<CreateQuery>, QueryRejection>,
    body: Result<Json<DataBody<PackData>>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let Json(body) = body?;
    let doc_id = service
        .create_pack(token.as_deref(), &query.id, body.data)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "packId": doc_id }))))
}

pub async fn get(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PackData>> {
    Ok(Json(service.get_pack(&id).await?))
}

pub async fn update(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    token: AuthToken,
    body: Result<Json<DataBody<PackData>>, JsonRejection>,
) -> ApiResult<&'static str> {
    let Json(body) = body?;
    service.update_pack(token.as_deref(), &id, body.data).await?;
    Ok("Updated data")
}

pub async fn delete(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    token: AuthToken,
) -> ApiResult<&'static str> {
    service.delete_pack(token.as_deref(), &id).await?;
    Ok("Deleted data")
}

pub async fn meta(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<PackMeta>> {
    Ok(Json(service.pack_meta(&id).await?))
}

fn contributors(uri: &Uri) -> ApiResult<Vec<UserId>> {
    let users: Vec<UserId> = repeated(&query_pairs(uri)?, "contributors")
        .into_iter()
        .map(UserId::from)
        .collect();
    if users.is_empty() {
        return Err(CatalogError::BadRequest("contributors must not be empty".to_string()).into());
    }
    Ok(users)
}

pub async fn add_contributors(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    token: AuthToken,
    uri: Uri,
) -> ApiResult<&'static str> {
    let users = contributors(&uri)?;
    service
        .add_contributors(token.as_deref(), &id, &users)
        .await?;
    Ok("Added contributors")
}

pub async fn remove_contributors(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
    token: AuthToken,
    uri: Uri,
) -> ApiResult<&'static str> {
    let users = contributors(&uri)?;
    service
        .remove_contributors(token.as_deref(), &id, &users)
        .await?;
    Ok("Deleted contributors")
}
