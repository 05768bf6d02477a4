//! Per-scope pass serialization.

use callsheet_core::ScopeId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out per-scope locks so overlapping passes for one scope serialize
/// while disjoint scopes run independently.
///
/// Each engine instance owns its lock map. Entity classes use disjoint scope
/// spaces, so a guest pass and a listing pass never contend even when they
/// reuse the same scope ID.
#[derive(Debug, Default)]
pub struct ScopeLocks {
    locks: Mutex<HashMap<ScopeId, Arc<Mutex<()>>>>,
}

impl ScopeLocks {
    /// Creates an empty lock map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `scope`, waiting behind any pass that already
    /// holds it. The guard releases on drop.
    pub async fn acquire(&self, scope: ScopeId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(scope).or_default())
        };
        lock.lock_owned().await
    }
}
