//! Source contracts for callsheet.
//!
//! This crate defines the seam between upstream sources and the
//! reconciliation engine:
//!
//! - [`SourceRecord`] - what every published record must expose
//! - [`Snapshot`] - a point-in-time fetch of one scope's records
//! - [`SnapshotFetcher`] - the async fetch contract, one impl per source
//! - [`FeedError`] - the fetch error taxonomy with transient/permanent
//!   classification
//!
//! Fetchers own transport and parsing; the engine consumes snapshots and
//! never sees the wire.

pub mod error;
pub mod fetch;
pub mod record;
pub mod snapshot;

pub use error::{FeedError, FeedResult};
pub use fetch::SnapshotFetcher;
pub use record::SourceRecord;
pub use snapshot::Snapshot;
