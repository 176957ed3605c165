//! Per-pack download counters.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Daily download counts for one pack.
///
/// `total` is tracked separately from `daily` so old days can be pruned
/// without losing the all-time count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadCounter {
    /// Pack document id.
    pub doc_id: String,
    #[serde(default)]
    pub daily: BTreeMap<NaiveDate, u64>,
    #[serde(default)]
    pub total: u64,
}

impl DownloadCounter {
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            ..Default::default()
        }
    }

    /// Add downloads for a day.
    pub fn record(&mut self, date: NaiveDate, count: u64) {
        *self.daily.entry(date).or_insert(0) += count;
        self.total += count;
    }

    /// Downloads on a single day.
    pub fn on(&self, date: NaiveDate) -> u64 {
        self.daily.get(&date).copied().unwrap_or(0)
    }

    /// Sum of the `days` days ending at `end`, inclusive.
    pub fn trailing_sum(&self, end: NaiveDate, days: u32) -> u64 {
        if days == 0 {
            return 0;
        }
        let start = end - Duration::days(i64::from(days) - 1);
        self.daily.range(start..=end).map(|(_, count)| count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_record_updates_day_and_total() {
        let mut counter = DownloadCounter::new("doc1");
        counter.record(day(1), 3);
        counter.record(day(1), 2);
        counter.record(day(2), 1);
        assert_eq!(counter.on(day(1)), 5);
        assert_eq!(counter.on(day(2)), 1);
        assert_eq!(counter.on(day(3)), 0);
        assert_eq!(counter.total, 6);
    }

    #[test]
    fn test_trailing_sum_is_inclusive_window() {
        let mut counter = DownloadCounter::new("doc1");
        for d in 1..=10 {
            counter.record(day(d), 1);
        }
        // Days 4..=10
        assert_eq!(counter.trailing_sum(day(10), 7), 7);
        // Days 1..=3 only
        assert_eq!(counter.trailing_sum(day(3), 7), 3);
        assert_eq!(counter.trailing_sum(day(10), 1), 1);
        assert_eq!(counter.trailing_sum(day(10), 0), 0);
    }

    #[test]
    fn test_counter_serializes_dates_as_keys() {
        let mut counter = DownloadCounter::new("doc1");
        counter.record(day(5), 4);
        let json = serde_json::to_value(&counter).unwrap();
        assert_eq!(json["daily"]["2024-03-05"], 4);
        let back: DownloadCounter = serde_json::from_value(json).unwrap();
        assert_eq!(back, counter);
    }
}
