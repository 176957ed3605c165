//! HTTP API.
//!
//! Every route is served both at the root and under `/v2`:
//!
//! ```text
//! GET    /packs                         list (search, sort, limit, start, category)
//! GET    /packs/count                   count with the same filters
//! POST   /packs?id                      create            ─► 201 {packId}
//! GET    /packs/:id                     pack data
//! PATCH  /packs/:id                     replace data      (contributor)
//! DELETE /packs/:id                     delete            (owner)
//! GET    /packs/:id/meta                {docId, stats, owner, contributors}
//! POST   /packs/:id/contributors        add               (owner)
//! DELETE /packs/:id/contributors        remove            (owner)
//! GET    /packs/:id/versions            all versions
//! POST   /packs/:id/versions?version    create            (contributor) ─► 201
//! GET    /packs/:id/versions/latest     highest semver
//! GET    /packs/:id/versions/resolve    highest semver supporting ?version
//! PATCH  /packs/:id/versions/:version   replace           (contributor)
//! DELETE /packs/:id/versions/:version   delete            (contributor)
//! POST   /bundles                       create            ─► 201 {bundleId}
//! GET    /bundles/:id                   bundle
//! PUT    /bundles/:id                   replace data      (owner)
//! DELETE /bundles/:id                   delete            (owner)
//! POST   /bundles/:id/packs?id          add at best version (owner) ─► 201
//! DELETE /bundles/:id/packs/:pack       remove            (owner)
//! POST   /users                         register display name
//! GET    /users/:id                     by uid or display name
//! GET    /users/:id/packs               packs the user contributes to
//! GET    /users/:id/bundles             bundles the user owns
//! GET    /download?pack&version         count and 302 to the file
//! GET    /health                        liveness
//! ```
//!
//! Write endpoints take the caller token from `?token=` or an
//! `Authorization: Bearer` header. Failures are JSON
//! `{statusCode, error, message}`.

mod bundles;
mod download;
mod error;
mod extract;
mod packs;
mod users;
mod versions;

pub use error::{status_for, ApiError, ErrorBody};
pub use extract::{AuthToken, DataBody};

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::Router;
use tracing::info;

use crate::catalog::CatalogService;

fn routes() -> Router<Arc<CatalogService>> {
    Router::new()
        .route("/packs", get(packs::list).post(packs::create))
        .route("/packs/count", get(packs::count))
        .route(
            "/packs/:id",
            get(packs::get).patch(packs::update).delete(packs::delete),
        )
        .route("/packs/:id/meta", get(packs::meta))
        .route(
            "/packs/:id/contributors",
            post(packs::add_contributors).delete(packs::remove_contributors),
        )
        .route(
            "/packs/:id/versions",
            get(versions::list).post(versions::create),
        )
        .route("/packs/:id/versions/latest", get(versions::latest))
        .route("/packs/:id/versions/resolve", get(versions::resolve))
        .route(
            "/packs/:id/versions/:version",
            patch(versions::update).delete(versions::delete),
        )
        .route("/bundles", post(bundles::create))
        .route(
            "/bundles/:id",
            get(bundles::get).put(bundles::update).delete(bundles::delete),
        )
        .route("/bundles/:id/packs", post(bundles::add_pack))
        .route(
            "/bundles/:id/packs/:pack",
            axum::routing::delete(bundles::remove_pack),
        )
        .route("/users", post(users::register))
        .route("/users/:id", get(users::get))
        .route("/users/:id/packs", get(users::packs))
        .route("/users/:id/bundles", get(users::bundles))
        .route("/download", get(download::download))
        .route("/health", get(download::health))
}

/// Build the application router.
pub fn router(service: Arc<CatalogService>) -> Router {
    let api = routes();
    Router::new()
        .merge(api.clone())
        .nest("/v2", api)
        .layer(middleware::from_fn(log_requests))
        .with_state(service)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}
