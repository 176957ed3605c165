//! Background aggregation loop.
//!
//! # Example
//!
//! ```ignore
//! use packhub::metrics::{MetricsDaemon, MetricsDaemonConfig};
//!
//! let shutdown = CancellationToken::new();
//! let daemon = MetricsDaemon::new(store, MetricsDaemonConfig::default());
//! let handle = tokio::spawn(daemon.run(shutdown.clone()));
//!
//! // later
//! shutdown.cancel();
//! handle.await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::aggregate::{aggregate_downloads, AggregateReport};
use crate::store::{CatalogStore, StoreResult};

/// Default time between aggregation passes.
pub const DEFAULT_METRICS_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Configuration for the metrics daemon.
#[derive(Clone, Debug)]
pub struct MetricsDaemonConfig {
    /// Time between passes. The first pass runs immediately.
    pub interval: Duration,
}

impl Default for MetricsDaemonConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_METRICS_INTERVAL,
        }
    }
}

impl MetricsDaemonConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Runs [`aggregate_downloads`] on a fixed interval.
pub struct MetricsDaemon {
    store: Arc<dyn CatalogStore>,
    config: MetricsDaemonConfig,
}

impl MetricsDaemon {
    pub fn new(store: Arc<dyn CatalogStore>, config: MetricsDaemonConfig) -> Self {
        Self { store, config }
    }

    /// Run a single pass for the current UTC date.
    pub async fn run_once(&self) -> StoreResult<AggregateReport> {
        aggregate_downloads(self.store.as_ref(), Utc::now().date_naive()).await
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// A failed pass is logged and the loop carries on.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval_secs = self.config.interval.as_secs(), "Metrics daemon starting");

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Metrics daemon shutting down");
                    break;
                }

                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(report) => info!(
                            counters = report.counters,
                            updated = report.updated,
                            unchanged = report.unchanged,
                            skipped = report.skipped,
                            "Download metrics aggregated"
                        ),
                        Err(e) => warn!(error = %e, "Download metrics aggregation failed"),
                    }
                }
            }
        }

        info!("Metrics daemon stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pack, PackData, UserId};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_daemon_runs_on_start_and_stops_on_cancel() {
        let store = Arc::new(MemoryStore::new());
        let pack = Pack::new(
            "doc1",
            "tcc",
            UserId::new("owner"),
            PackData::new("", "TCC"),
            Utc::now(),
        );
        store.insert_pack(pack).await.unwrap();
        store
            .record_downloads("doc1", Utc::now().date_naive(), 3)
            .await
            .unwrap();

        let shutdown = CancellationToken::new();
        let daemon = MetricsDaemon::new(
            store.clone(),
            MetricsDaemonConfig::default().with_interval(Duration::from_secs(3600)),
        );
        let handle = tokio::spawn(daemon.run(shutdown.clone()));

        let mut total = 0;
        for _ in 0..50 {
            total = store.get_pack("doc1").await.unwrap().unwrap().stats.downloads.total;
            if total == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(total, 3);

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("daemon did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_once_on_empty_store() {
        let daemon = MetricsDaemon::new(Arc::new(MemoryStore::new()), MetricsDaemonConfig::default());
        assert_eq!(daemon.run_once().await.unwrap(), AggregateReport::default());
    }
}
