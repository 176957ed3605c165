//! Counter aggregation.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::model::DownloadStats;
use crate::store::{CatalogStore, DownloadCounter, StoreError, StoreResult};

/// Length of the trailing window, today included.
pub const TRAILING_DAYS: u32 = 7;

const MAX_WRITE_ATTEMPTS: usize = 3;

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Counters examined.
    pub counters: usize,
    /// Packs whose stats were rewritten.
    pub updated: usize,
    /// Packs whose stats already matched.
    pub unchanged: usize,
    /// Counters whose pack no longer exists.
    pub skipped: usize,
}

/// Statistics a counter produces for `today`.
fn stats_for(counter: &DownloadCounter, today: NaiveDate) -> DownloadStats {
    DownloadStats {
        total: counter.total,
        today: counter.on(today),
        past_week: counter.trailing_sum(today, TRAILING_DAYS),
    }
}

/// Recompute every pack's cached download statistics.
///
/// Safe to re-run: the result depends only on the counters and `today`.
pub async fn aggregate_downloads(
    store: &dyn CatalogStore,
    today: NaiveDate,
) -> StoreResult<AggregateReport> {
    let mut report = AggregateReport::default();

    for counter in store.list_counters().await? {
        report.counters += 1;
        let stats = stats_for(&counter, today);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let Some(mut pack) = store.get_pack(&counter.doc_id).await? else {
                debug!(doc_id = %counter.doc_id, "Counter has no pack, skipping");
                report.skipped += 1;
                break;
            };
            if pack.stats.downloads == stats {
                report.unchanged += 1;
                break;
            }

            pack.stats.downloads = stats;
            match store.replace_pack(pack).await {
                Ok(_) => {
                    report.updated += 1;
                    break;
                }
                Err(StoreError::RevisionMismatch { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(doc_id = %counter.doc_id, attempt, "Pack changed during aggregation, retrying");
                }
                Err(e) => {
                    warn!(doc_id = %counter.doc_id, error = %e, "Failed to write download stats");
                    return Err(e);
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pack, PackData, UserId};
    use crate::store::MemoryStore;
    use chrono::{Days, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn store_with_pack(doc_id: &str) -> MemoryStore {
        let store = MemoryStore::new();
        let pack = Pack::new(
            doc_id,
            format!("pack-{}", doc_id),
            UserId::new("owner"),
            PackData::new("", "Pack"),
            Utc::now(),
        );
        store.insert_pack(pack).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_aggregates_trailing_week_today_and_total() {
        let store = store_with_pack("doc1").await;
        let today = date(2024, 3, 10);
        store.record_downloads("doc1", today, 4).await.unwrap();
        store
            .record_downloads("doc1", today.checked_sub_days(Days::new(6)).unwrap(), 3)
            .await
            .unwrap();
        store
            .record_downloads("doc1", today.checked_sub_days(Days::new(7)).unwrap(), 100)
            .await
            .unwrap();

        let report = aggregate_downloads(&store, today).await.unwrap();
        assert_eq!(report.updated, 1);

        let pack = store.get_pack("doc1").await.unwrap().unwrap();
        assert_eq!(
            pack.stats.downloads,
            DownloadStats {
                total: 107,
                today: 4,
                past_week: 7,
            }
        );
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let store = store_with_pack("doc1").await;
        let today = date(2024, 3, 10);
        store.record_downloads("doc1", today, 2).await.unwrap();

        aggregate_downloads(&store, today).await.unwrap();
        let first = store.get_pack("doc1").await.unwrap().unwrap();

        let report = aggregate_downloads(&store, today).await.unwrap();
        let second = store.get_pack("doc1").await.unwrap().unwrap();

        assert_eq!(report.unchanged, 1);
        assert_eq!(report.updated, 0);
        assert_eq!(first.stats.downloads, second.stats.downloads);
        assert_eq!(first.revision, second.revision);
    }

    #[tokio::test]
    async fn test_window_rolls_forward() {
        let store = store_with_pack("doc1").await;
        let day = date(2024, 3, 10);
        store.record_downloads("doc1", day, 5).await.unwrap();

        aggregate_downloads(&store, day.checked_add_days(Days::new(1)).unwrap())
            .await
            .unwrap();
        let pack = store.get_pack("doc1").await.unwrap().unwrap();
        assert_eq!(pack.stats.downloads.today, 0);
        assert_eq!(pack.stats.downloads.past_week, 5);

        aggregate_downloads(&store, day.checked_add_days(Days::new(7)).unwrap())
            .await
            .unwrap();
        let pack = store.get_pack("doc1").await.unwrap().unwrap();
        assert_eq!(pack.stats.downloads.past_week, 0);
        assert_eq!(pack.stats.downloads.total, 5);
    }

    #[tokio::test]
    async fn test_orphan_counters_are_skipped() {
        let store = MemoryStore::new();
        store
            .record_downloads("gone", date(2024, 1, 1), 1)
            .await
            .unwrap();

        let report = aggregate_downloads(&store, date(2024, 1, 1)).await.unwrap();
        assert_eq!(report.counters, 1);
        assert_eq!(report.skipped, 1);
    }
}
