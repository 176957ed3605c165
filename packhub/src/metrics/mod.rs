//! Rolling download metrics.
//!
//! Download counts are written as per-day counters (see
//! [`DownloadCounter`](crate::store::DownloadCounter)). A periodic job folds
//! them into the cached `stats.downloads` field of each pack, which the
//! listing sorts read.
//!
//! ```text
//! counters ─► aggregate_downloads(today) ─► pack.stats.downloads
//!                      ▲
//!          MetricsDaemon (on start, then every interval)
//! ```

mod aggregate;
mod daemon;

pub use aggregate::{aggregate_downloads, AggregateReport, TRAILING_DAYS};
pub use daemon::{MetricsDaemon, MetricsDaemonConfig, DEFAULT_METRICS_INTERVAL};
