//! Pass reports for operational review.

use crate::outcome::IngestResult;
use callsheet_core::ScopeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One reconciliation pass wrapped with timing, for logs and exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Scope the pass ran against.
    pub scope: ScopeId,
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// When the pass finished, commit included.
    pub finished_at: DateTime<Utc>,
    /// Aggregated counts.
    pub result: IngestResult,
}

impl IngestReport {
    /// Wraps a pass result with its timing.
    #[must_use]
    pub fn new(
        scope: ScopeId,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        result: IngestResult,
    ) -> Self {
        Self {
            scope,
            started_at,
            finished_at,
            result,
        }
    }

    /// Pass duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// CSV header matching [`to_csv_row`](Self::to_csv_row).
    #[must_use]
    pub fn csv_header() -> &'static str {
        "scope,started_at,finished_at,duration_ms,created,updated,unchanged,removed,processed,skipped,observed_at"
    }

    /// Renders this pass as one CSV row.
    #[must_use]
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{}",
            self.scope,
            self.started_at.to_rfc3339(),
            self.finished_at.to_rfc3339(),
            self.duration_ms(),
            self.result.created,
            self.result.updated,
            self.result.unchanged,
            self.result.removed,
            self.result.processed,
            self.result.skipped,
            self.result.observed_at.to_rfc3339(),
        )
    }

    /// Renders a CSV document for a batch of reports.
    #[must_use]
    pub fn to_csv(reports: &[IngestReport]) -> String {
        let mut csv = String::from(Self::csv_header());
        csv.push('\n');
        for report in reports {
            csv.push_str(&report.to_csv_row());
            csv.push('\n');
        }
        csv
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scope {}: {} created, {} updated, {} unchanged, {} removed, {} skipped in {}ms",
            self.scope,
            self.result.created,
            self.result.updated,
            self.result.unchanged,
            self.result.removed,
            self.result.skipped,
            self.duration_ms(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn sample_report() -> IngestReport {
        let mut result = IngestResult::noop(ts(50));
        result.record(Outcome::Created);
        result.record(Outcome::Updated);
        result.record(Outcome::Removed);
        IngestReport::new(ScopeId::global(), ts(100), ts(103), result)
    }

    #[test]
    fn test_duration() {
        assert_eq!(sample_report().duration_ms(), 3000);
    }

    #[test]
    fn test_csv_row_matches_header_width() {
        let report = sample_report();
        let header_fields = IngestReport::csv_header().split(',').count();
        let row_fields = report.to_csv_row().split(',').count();
        assert_eq!(header_fields, row_fields);
    }

    #[test]
    fn test_csv_document() {
        let reports = vec![sample_report(), sample_report()];
        let csv = IngestReport::to_csv(&reports);
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("scope,"));
    }

    #[test]
    fn test_display_summary() {
        let rendered = sample_report().to_string();
        assert!(rendered.contains("1 created"));
        assert!(rendered.contains("1 updated"));
        assert!(rendered.contains("1 removed"));
        assert!(rendered.contains("3000ms"));
    }
}
