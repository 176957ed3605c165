//! `/users` handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::error::ApiError;
use super::extract::{AuthToken, DataBody};
use crate::catalog::CatalogService;
use crate::model::User;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    display_name: String,
}

pub async fn register(
    State(service): State<Arc<CatalogService>>,
    token: AuthToken,
    body: Result<Json<DataBody<Registration>>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(body) = body?;
    Ok(Json(
        service
            .register_user(token.as_deref(), &body.data.display_name)
            .await?,
    ))
}

pub async fn get(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(service.get_user(&id).await?))
}

pub async fn packs(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(service.user_packs(&id).await?))
}

pub async fn bundles(
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(service.user_bundles(&id).await?))
}
