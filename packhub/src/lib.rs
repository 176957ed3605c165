//! PackHub - Catalog service for community add-on packs and bundles
//!
//! This library provides the data model, mutation rules and REST API for a
//! catalog of semver-versioned packs, the bundles that collect them, and the
//! background job that keeps download statistics fresh.
//!
//! # Layers
//!
//! ```text
//! api (axum) ──► catalog::CatalogService ──► store::CatalogStore
//!                     │                          ▲
//!                     ├── auth::TokenVerifier    │
//!                     └── versioning             metrics::MetricsDaemon
//! ```

pub mod api;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod format;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod search;
pub mod store;
pub mod versioning;

/// Crate version, used in startup banners and the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
