//! Application bootstrap implementation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::api;
use crate::auth::StaticTokenVerifier;
use crate::catalog::CatalogService;
use crate::metrics::MetricsDaemon;
use crate::store::MemoryStore;

/// A running catalog server with its background tasks.
///
/// # Example
///
/// ```ignore
/// use packhub::app::{AppConfig, PackHubApp};
///
/// let app = PackHubApp::start(AppConfig::default()).await?;
/// println!("listening on {}", app.local_addr());
///
/// // Later: graceful shutdown, writes the final snapshot
/// app.shutdown().await?;
/// ```
pub struct PackHubApp {
    service: Arc<CatalogService>,
    store: Arc<MemoryStore>,
    local_addr: SocketAddr,
    snapshot: Option<PathBuf>,
    shutdown: CancellationToken,
    server: JoinHandle<std::io::Result<()>>,
    tasks: Vec<JoinHandle<()>>,
}

impl PackHubApp {
    /// Start the application.
    ///
    /// 1. Load the snapshot, if configured
    /// 2. Build the token verifier and catalog service
    /// 3. Spawn the metrics daemon and the autosave task
    /// 4. Bind the listener and serve the API
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        info!("Starting PackHub");

        let store = match &config.snapshot {
            Some(path) => Arc::new(MemoryStore::load_snapshot(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        let snapshot = store.snapshot();
        info!(
            snapshot = ?config.snapshot.as_ref().map(|p| p.display().to_string()),
            packs = snapshot.packs.len(),
            bundles = snapshot.bundles.len(),
            users = snapshot.users.len(),
            "Catalog loaded"
        );

        let verifier: StaticTokenVerifier = config.tokens.iter().cloned().collect();
        if verifier.is_empty() {
            warn!("No tokens configured; every write request will be rejected");
        }
        let service = Arc::new(CatalogService::new(store.clone(), Arc::new(verifier)));

        let shutdown = CancellationToken::new();
        let mut tasks = Vec::new();

        if let Some(metrics) = config.metrics.clone() {
            let daemon = MetricsDaemon::new(store.clone(), metrics);
            tasks.push(tokio::spawn(daemon.run(shutdown.clone())));
        }

        if let (Some(path), Some(every)) = (&config.snapshot, config.autosave) {
            tasks.push(tokio::spawn(autosave(
                store.clone(),
                path.clone(),
                every,
                shutdown.clone(),
            )));
            info!(path = %path.display(), interval_secs = every.as_secs(), "Snapshot autosave enabled");
        }

        let address = config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| AppError::Bind {
                address: address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(AppError::Server)?;

        let router = api::router(service.clone());
        let server_shutdown = shutdown.clone();
        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(server_shutdown.cancelled_owned())
                .await
        });

        info!(address = %local_addr, "PackHub API listening");

        Ok(Self {
            service,
            store,
            local_addr,
            snapshot: config.snapshot,
            shutdown,
            server,
            tasks,
        })
    }

    pub fn service(&self) -> Arc<CatalogService> {
        Arc::clone(&self.service)
    }

    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Token that stops the server and background tasks when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop serving, wait for background tasks and write the final snapshot.
    pub async fn shutdown(self) -> Result<(), AppError> {
        info!("Shutting down PackHub");
        self.shutdown.cancel();

        let served = self
            .server
            .await
            .map_err(|e| AppError::Task(e.to_string()))?;
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task did not stop cleanly");
            }
        }

        if let Some(path) = &self.snapshot {
            save(self.store.clone(), path.clone()).await?;
            info!(path = %path.display(), "Final snapshot written");
        }

        served.map_err(AppError::Server)?;
        info!("PackHub stopped");
        Ok(())
    }
}

async fn save(store: Arc<MemoryStore>, path: PathBuf) -> Result<(), AppError> {
    tokio::task::spawn_blocking(move || store.save_snapshot(Path::new(&path)))
        .await
        .map_err(|e| AppError::Task(e.to_string()))?
        .map_err(AppError::Store)
}

async fn autosave(
    store: Arc<MemoryStore>,
    path: PathBuf,
    every: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately; the catalog was just loaded.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            _ = ticker.tick() => {
                if let Err(e) = save(store.clone(), path.clone()).await {
                    warn!(path = %path.display(), error = %e, "Snapshot autosave failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PackData;
    use tempfile::TempDir;

    fn test_config() -> AppConfig {
        AppConfig::default()
            .with_bind("127.0.0.1", 0)
            .with_metrics(None)
            .with_token("t1", "alice")
    }

    #[tokio::test]
    async fn test_start_and_shutdown_writes_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");

        let app = PackHubApp::start(test_config().with_snapshot(&path))
            .await
            .unwrap();
        assert_ne!(app.local_addr().port(), 0);
        app.service()
            .create_pack(Some("t1"), "tcc", PackData::new("", "TCC"))
            .await
            .unwrap();
        app.shutdown().await.unwrap();

        let reloaded = PackHubApp::start(test_config().with_snapshot(&path))
            .await
            .unwrap();
        assert_eq!(
            reloaded.service().get_pack("tcc").await.unwrap().display.name,
            "TCC"
        );
        reloaded.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let first = PackHubApp::start(test_config()).await.unwrap();
        let port = first.local_addr().port();

        let err = PackHubApp::start(test_config().with_bind("127.0.0.1", port))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Bind { .. }));
        first.shutdown().await.unwrap();
    }
}
