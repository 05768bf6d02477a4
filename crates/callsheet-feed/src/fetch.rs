//! Fetcher contract for upstream sources.

use crate::error::FeedResult;
use crate::record::SourceRecord;
use crate::snapshot::Snapshot;
use async_trait::async_trait;
use callsheet_core::ScopeId;

/// Produces snapshots of one upstream source.
///
/// A fetcher owns transport and parsing for its source; the engine only sees
/// the resulting [`Snapshot`]. Return an empty snapshot when the source
/// genuinely publishes nothing for the scope, and an error when the roster
/// could not be retrieved or understood.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Record type this fetcher produces.
    type Record: SourceRecord + Send + Sync;

    /// Fetches the current snapshot for `scope`.
    async fn fetch(&self, scope: ScopeId) -> FeedResult<Snapshot<Self::Record>>;
}
