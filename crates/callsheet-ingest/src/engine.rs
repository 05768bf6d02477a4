//! The reconciliation engine.
//!
//! Drives one entity class: build the key index, reconcile each record,
//! sweep unseen keys, aggregate the outcome. The async entry points wrap the
//! in-memory pass with per-scope locking, a point-in-time load, and an atomic
//! commit.

use crate::config::{IngestConfig, IngestMode};
use crate::entity::Reconcilable;
use crate::error::{ReconcileError, ReconcileResult};
use crate::key_index::KeyIndex;
use crate::outcome::{IngestResult, Outcome};
use crate::report::IngestReport;
use crate::scope::ScopeLocks;
use crate::store::EntityStore;
use crate::suppress::{NoSuppression, SuppressionPolicy};
use callsheet_core::{NaturalKey, ScopeId};
use callsheet_feed::{Snapshot, SnapshotFetcher, SourceRecord};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Reconciles snapshots of one entity class into a persisted scope.
///
/// One instance per entity class; the instance owns the per-scope locks, so
/// overlapping passes for the same scope serialize while other classes run
/// freely.
pub struct Reconciler<E: Reconcilable> {
    config: IngestConfig,
    suppression: Arc<dyn SuppressionPolicy<E::Record>>,
    cancel: CancellationToken,
    locks: ScopeLocks,
}

impl<E: Reconcilable> Reconciler<E> {
    /// Engine with default configuration and no suppression.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(IngestConfig::default())
    }

    /// Engine with an explicit configuration.
    #[must_use]
    pub fn with_config(config: IngestConfig) -> Self {
        Self {
            config,
            suppression: Arc::new(NoSuppression),
            cancel: CancellationToken::new(),
            locks: ScopeLocks::new(),
        }
    }

    /// Installs a suppression policy, evaluated for every visited record.
    #[must_use]
    pub fn with_suppression(mut self, policy: impl SuppressionPolicy<E::Record> + 'static) -> Self {
        self.suppression = Arc::new(policy);
        self
    }

    /// Installs a cancellation token, checked between records and once more
    /// before commit.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// In-memory pass over one scope's entity set.
    ///
    /// Mutates `entities` in place and classifies every record. Fails only on
    /// cancellation; the caller decides what happens to the mutated set
    /// (commit it, inspect it, or discard it for a dry run).
    pub fn apply(
        &self,
        scope: ScopeId,
        entities: &mut Vec<E>,
        snapshot: &Snapshot<E::Record>,
    ) -> ReconcileResult<IngestResult> {
        let observed_at = snapshot.observed_at();
        let mut index = KeyIndex::build(entities.as_slice());
        let mut visited: HashSet<usize> = HashSet::with_capacity(snapshot.len());
        let mut result = IngestResult::noop(observed_at);

        if index.orphans() > 0 {
            debug!(
                scope = %scope,
                orphans = index.orphans(),
                "ignoring entities without a natural key"
            );
        }

        for record in &snapshot.records {
            if self.cancel.is_cancelled() {
                return Err(ReconcileError::Cancelled { scope });
            }

            let Some(key) = NaturalKey::new(record.natural_key()) else {
                debug!(scope = %scope, "skipping record with blank natural key");
                result.record_skipped();
                continue;
            };

            let outcome = match index.get(&key) {
                Some(slot) => {
                    visited.insert(slot);
                    let entity = &mut entities[slot];
                    let mut changed = entity.apply_fields(record);
                    changed |= entity.sync_children(record);
                    changed |= Self::transition_presence(
                        entity,
                        record,
                        self.suppression.as_ref(),
                        observed_at,
                    );
                    entity.record_seen(observed_at);
                    if changed {
                        entity.record_changed(observed_at);
                        Outcome::Updated
                    } else {
                        Outcome::Unchanged
                    }
                }
                None => {
                    let mut entity = E::create(key.clone(), observed_at);
                    entity.apply_fields(record);
                    entity.sync_children(record);
                    Self::transition_presence(
                        &mut entity,
                        record,
                        self.suppression.as_ref(),
                        observed_at,
                    );
                    let slot = entities.len();
                    entities.push(entity);
                    index.insert(key, slot);
                    visited.insert(slot);
                    Outcome::Created
                }
            };
            result.record(outcome);
        }

        if self.config.mode == IngestMode::Full {
            self.sweep(entities, &index, &visited, observed_at, &mut result);
        }

        Ok(result)
    }

    /// Soft-deletes every indexed, unvisited, still-active entity. Classes
    /// without a presence state are left untouched, as are orphans (never
    /// indexed) and entities already removed.
    fn sweep(
        &self,
        entities: &mut [E],
        index: &KeyIndex,
        visited: &HashSet<usize>,
        observed_at: DateTime<Utc>,
        result: &mut IngestResult,
    ) {
        for (_, slot) in index.iter() {
            if visited.contains(&slot) {
                continue;
            }
            let entity = &mut entities[slot];
            if let Some(mut presence) = entity.presence() {
                if presence.remove(observed_at) {
                    entity.set_presence(presence);
                    result.record(Outcome::Removed);
                }
            }
        }
    }

    /// Presence transitions for a visited entity: suppression removes,
    /// otherwise a removed entity restores with its identity intact. Returns
    /// whether a transition fired.
    fn transition_presence(
        entity: &mut E,
        record: &E::Record,
        suppression: &dyn SuppressionPolicy<E::Record>,
        observed_at: DateTime<Utc>,
    ) -> bool {
        let Some(mut presence) = entity.presence() else {
            return false;
        };
        let transitioned = if suppression.is_suppressed(record) {
            presence.remove(observed_at)
        } else {
            presence.restore()
        };
        if transitioned {
            entity.set_presence(presence);
        }
        transitioned
    }

    /// Full pass: serialize on the scope, load its entity set, apply the
    /// snapshot, commit atomically.
    ///
    /// An unknown scope yields a zero-result outcome without mutating
    /// anything. Cancellation aborts between records and once more before
    /// commit; a cancelled pass commits nothing. Once the commit has started
    /// it runs to completion.
    #[instrument(skip(self, store, snapshot), fields(scope = %scope, records = snapshot.len()))]
    pub async fn reconcile<S>(
        &self,
        store: &S,
        scope: ScopeId,
        snapshot: &Snapshot<E::Record>,
    ) -> ReconcileResult<IngestResult>
    where
        S: EntityStore<E>,
    {
        let _guard = self.locks.acquire(scope).await;

        let Some(mut entities) = store.load_scope(scope).await? else {
            warn!(scope = %scope, "scope not found, reporting zero-result pass");
            return Ok(IngestResult::noop(snapshot.observed_at()));
        };

        let result = self.apply(scope, &mut entities, snapshot)?;

        if self.config.dry_run {
            info!(
                scope = %scope,
                created = result.created,
                updated = result.updated,
                unchanged = result.unchanged,
                removed = result.removed,
                skipped = result.skipped,
                "dry run, skipping commit"
            );
            return Ok(result);
        }

        if self.cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled { scope });
        }
        store.commit_scope(scope, entities).await?;

        info!(
            scope = %scope,
            created = result.created,
            updated = result.updated,
            unchanged = result.unchanged,
            removed = result.removed,
            skipped = result.skipped,
            "reconciliation pass committed"
        );
        Ok(result)
    }

    /// Runs [`reconcile`](Self::reconcile) and wraps the outcome in a timed
    /// report.
    pub async fn reconcile_with_report<S>(
        &self,
        store: &S,
        scope: ScopeId,
        snapshot: &Snapshot<E::Record>,
    ) -> ReconcileResult<IngestReport>
    where
        S: EntityStore<E>,
    {
        let started_at = Utc::now();
        let result = self.reconcile(store, scope, snapshot).await?;
        Ok(IngestReport::new(scope, started_at, Utc::now(), result))
    }

    /// Fetches the scope's current snapshot and reconciles it in one call.
    #[instrument(skip(self, fetcher, store), fields(scope = %scope))]
    pub async fn fetch_and_reconcile<F, S>(
        &self,
        fetcher: &F,
        store: &S,
        scope: ScopeId,
    ) -> ReconcileResult<IngestResult>
    where
        F: SnapshotFetcher<Record = E::Record>,
        S: EntityStore<E>,
    {
        let snapshot = fetcher.fetch(scope).await?;
        self.reconcile(store, scope, &snapshot).await
    }
}

impl<E: Reconcilable> Default for Reconciler<E> {
    fn default() -> Self {
        Self::new()
    }
}
