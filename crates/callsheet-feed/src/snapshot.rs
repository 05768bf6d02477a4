//! Point-in-time snapshots of an upstream roster.

use crate::record::SourceRecord;
use chrono::{DateTime, Utc};

/// A full fetch of one scope's records at a point in time.
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    /// Records in source order.
    pub records: Vec<R>,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
}

impl<R> Snapshot<R> {
    /// Creates a snapshot stamped with the current time.
    #[must_use]
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            fetched_at: Utc::now(),
        }
    }

    /// Creates a snapshot with an explicit fetch time.
    #[must_use]
    pub fn with_fetched_at(records: Vec<R>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            records,
            fetched_at,
        }
    }

    /// Number of records in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot carries no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: SourceRecord> Snapshot<R> {
    /// The batch observation timestamp: the maximum record observation time,
    /// or the fetch time for an empty batch.
    ///
    /// Every entity touched by a pass gets this single timestamp as its seen
    /// time, even when records carry individually differing observation
    /// times.
    #[must_use]
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.records
            .iter()
            .map(SourceRecord::observed_at)
            .max()
            .unwrap_or(self.fetched_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Row {
        key: String,
        observed_at: DateTime<Utc>,
    }

    impl SourceRecord for Row {
        fn natural_key(&self) -> &str {
            &self.key
        }

        fn observed_at(&self) -> DateTime<Utc> {
            self.observed_at
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn row(key: &str, secs: i64) -> Row {
        Row {
            key: key.to_string(),
            observed_at: ts(secs),
        }
    }

    #[test]
    fn test_observed_at_takes_record_maximum() {
        let snapshot = Snapshot::with_fetched_at(vec![row("a", 10), row("b", 30), row("c", 20)], ts(5));
        assert_eq!(snapshot.observed_at(), ts(30));
    }

    #[test]
    fn test_observed_at_falls_back_to_fetch_time() {
        let snapshot: Snapshot<Row> = Snapshot::with_fetched_at(Vec::new(), ts(99));
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.observed_at(), ts(99));
    }

    #[test]
    fn test_len() {
        let snapshot = Snapshot::with_fetched_at(vec![row("a", 1), row("b", 2)], ts(3));
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.is_empty());
    }
}
