//! Application bootstrap and lifecycle management.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          PackHubApp                           │
//! │                                                               │
//! │  MemoryStore ◄── snapshot.json (load on start, save on stop)  │
//! │      │                                                        │
//! │      ├──► CatalogService ──► axum router ──► TcpListener      │
//! │      │        └── StaticTokenVerifier ([tokens])              │
//! │      ├──► MetricsDaemon (interval)                            │
//! │      └──► autosave task (interval)                            │
//! │                                                               │
//! │  CancellationToken stops all three                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::PackHubApp;
pub use config::AppConfig;
pub use error::AppError;
