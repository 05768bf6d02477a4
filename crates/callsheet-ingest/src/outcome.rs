//! Pass outcomes and result aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of one reconciled record or swept entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No entity matched the record's key; one was created.
    Created,
    /// The record matched an entity and at least one thing changed.
    Updated,
    /// The record matched an entity and nothing changed.
    Unchanged,
    /// The entity's key vanished from the snapshot and it was soft-deleted.
    Removed,
}

impl Outcome {
    /// String representation of the outcome.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "unchanged" => Ok(Self::Unchanged),
            "removed" => Ok(Self::Removed),
            _ => Err(format!("Invalid outcome: {s}")),
        }
    }
}

/// Aggregated result of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResult {
    /// Entities created.
    pub created: u32,
    /// Entities visited with at least one change.
    pub updated: u32,
    /// Entities visited with no change.
    pub unchanged: u32,
    /// Entities soft-deleted by the absence sweep.
    pub removed: u32,
    /// Valid-keyed records processed; duplicates count individually.
    pub processed: u32,
    /// Blank-key records skipped. Informational, never part of `processed`.
    pub skipped: u32,
    /// Batch observation timestamp.
    pub observed_at: DateTime<Utc>,
}

impl IngestResult {
    /// Zero-result outcome for a pass that touched nothing.
    #[must_use]
    pub fn noop(observed_at: DateTime<Utc>) -> Self {
        Self {
            created: 0,
            updated: 0,
            unchanged: 0,
            removed: 0,
            processed: 0,
            skipped: 0,
            observed_at,
        }
    }

    /// Whether the pass touched nothing at all.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.processed == 0 && self.removed == 0 && self.skipped == 0
    }

    /// Records one classified outcome. Record outcomes feed `processed`;
    /// sweeps do not, because no record backed them.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => {
                self.created += 1;
                self.processed += 1;
            }
            Outcome::Updated => {
                self.updated += 1;
                self.processed += 1;
            }
            Outcome::Unchanged => {
                self.unchanged += 1;
                self.processed += 1;
            }
            Outcome::Removed => self.removed += 1,
        }
    }

    /// Records a skipped blank-key record.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Folds another pass result into this one, for jobs that reconcile many
    /// scopes. Counts add up; the observation timestamp takes the newer of
    /// the two.
    pub fn absorb(&mut self, other: &IngestResult) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.removed += other.removed;
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.observed_at = self.observed_at.max(other.observed_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_outcome_string_roundtrip() {
        for outcome in [
            Outcome::Created,
            Outcome::Updated,
            Outcome::Unchanged,
            Outcome::Removed,
        ] {
            assert_eq!(outcome.as_str().parse::<Outcome>().unwrap(), outcome);
        }
        assert!("vanished".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_outcome_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Outcome::Created).unwrap(), "\"created\"");
    }

    #[test]
    fn test_record_outcomes_feed_processed() {
        let mut result = IngestResult::noop(ts(1));
        result.record(Outcome::Created);
        result.record(Outcome::Updated);
        result.record(Outcome::Unchanged);
        result.record(Outcome::Removed);

        assert_eq!(result.created, 1);
        assert_eq!(result.updated, 1);
        assert_eq!(result.unchanged, 1);
        assert_eq!(result.removed, 1);
        assert_eq!(result.processed, 3);
    }

    #[test]
    fn test_noop_detection() {
        let mut result = IngestResult::noop(ts(1));
        assert!(result.is_noop());
        result.record_skipped();
        assert!(!result.is_noop());
    }

    #[test]
    fn test_absorb_sums_counts_and_takes_newest_timestamp() {
        let mut total = IngestResult::noop(ts(100));
        total.record(Outcome::Created);

        let mut other = IngestResult::noop(ts(200));
        other.record(Outcome::Updated);
        other.record(Outcome::Removed);

        total.absorb(&other);
        assert_eq!(total.created, 1);
        assert_eq!(total.updated, 1);
        assert_eq!(total.removed, 1);
        assert_eq!(total.processed, 2);
        assert_eq!(total.observed_at, ts(200));
    }
}
