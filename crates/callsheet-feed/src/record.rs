//! Source record contract.

use chrono::{DateTime, Utc};

/// A single record as published by an upstream source.
///
/// Implementations are plain data produced by a fetcher. The reconciliation
/// engine needs only the key and the observation time; everything else is
/// per-class knowledge.
pub trait SourceRecord {
    /// The record's natural key exactly as published. May be blank for
    /// malformed rows; blank-keyed records are skipped during reconciliation.
    fn natural_key(&self) -> &str;

    /// When the fetcher observed this record.
    fn observed_at(&self) -> DateTime<Utc>;
}
