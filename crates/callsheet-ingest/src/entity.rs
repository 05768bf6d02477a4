//! Entity-class contract for the reconciliation engine.

use callsheet_core::{NaturalKey, Presence};
use callsheet_feed::SourceRecord;
use chrono::{DateTime, Utc};

/// Binds a persisted entity class to the source record shape it reconciles
/// from.
///
/// One implementation per entity class. The engine drives these callbacks and
/// owns classification; implementations hold the per-class knowledge: which
/// scalar fields diff, how child collections synchronize, and whether the
/// class soft-deletes.
pub trait Reconcilable: Send + Sized {
    /// Source record shape for this class.
    type Record: SourceRecord + Send + Sync;

    /// The entity's natural key. `None` marks an orphan row that predates key
    /// tracking; orphans are invisible to the whole pass, sweep included.
    fn natural_key(&self) -> Option<&NaturalKey>;

    /// Builds an empty entity shell for a first observation. The engine
    /// applies fields and children immediately afterwards, so scalar defaults
    /// here never survive a pass.
    fn create(key: NaturalKey, observed_at: DateTime<Utc>) -> Self;

    /// Copies differing scalar fields from `record`. Returns whether any
    /// field changed.
    fn apply_fields(&mut self, record: &Self::Record) -> bool;

    /// Synchronizes owned child collections from `record`. Returns whether
    /// anything changed.
    fn sync_children(&mut self, record: &Self::Record) -> bool;

    /// Stamps the seen time for a pass that visited this entity. Stamps
    /// forward only, so a stale batch never moves the timestamp back.
    fn record_seen(&mut self, observed_at: DateTime<Utc>);

    /// Stamps the change time after a pass that changed this entity. Forward
    /// only, same rule as [`record_seen`](Self::record_seen).
    fn record_changed(&mut self, observed_at: DateTime<Utc>);

    /// Current presence state. `None` for classes that never soft-delete;
    /// such classes are ignored by the absence sweep.
    fn presence(&self) -> Option<Presence> {
        None
    }

    /// Replaces the presence state. No-op default for classes without one.
    fn set_presence(&mut self, presence: Presence) {
        let _ = presence;
    }
}
