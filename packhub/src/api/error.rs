//! JSON error responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::catalog::CatalogError;

/// Error body sent for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

/// A catalog error on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(&self.0)
    }
}

/// HTTP status for a catalog error.
pub fn status_for(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::InvalidVersion(_)
        | CatalogError::Invalid(_)
        | CatalogError::BadRequest(_) => StatusCode::BAD_REQUEST,
        CatalogError::Unauthorized => StatusCode::UNAUTHORIZED,
        CatalogError::Forbidden(_) => StatusCode::FORBIDDEN,
        CatalogError::NotFound { .. } | CatalogError::NoVersions(_) => StatusCode::NOT_FOUND,
        CatalogError::Conflict(_) => StatusCode::CONFLICT,
        CatalogError::NoCompatibleVersion { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(CatalogError::BadRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(CatalogError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "Request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&CatalogError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(&CatalogError::Forbidden("no".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&CatalogError::pack_not_found("x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&CatalogError::InvalidVersion("1".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&CatalogError::NoCompatibleVersion {
                pack: "x".into(),
                game_version: "1.19".into(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let store = CatalogError::Store(StoreError::NotFound {
            kind: "pack",
            id: "x".into(),
        });
        assert_eq!(status_for(&store), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_response_status() {
        let response = ApiError(CatalogError::Conflict("taken".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
