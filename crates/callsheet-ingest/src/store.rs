//! Persistence seam and the in-memory store.

use async_trait::async_trait;
use callsheet_core::ScopeId;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure
        message: String,
    },

    /// The commit was rejected after mutations were computed.
    #[error("Commit failed for scope {scope}: {message}")]
    CommitFailed {
        /// Scope whose commit failed
        scope: ScopeId,
        /// Human-readable description of the rejection
        message: String,
    },

    /// Stored state could not be decoded.
    #[error("Corrupt stored state: {message}")]
    Corrupt {
        /// What was wrong with the stored state
        message: String,
    },
}

impl StoreError {
    /// Creates a store-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a commit-failed error.
    pub fn commit_failed(scope: ScopeId, message: impl Into<String>) -> Self {
        Self::CommitFailed {
            scope,
            message: message.into(),
        }
    }

    /// Creates a corrupt-state error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Whether retrying the operation may succeed without intervention.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::CommitFailed { .. })
    }
}

/// Point-in-time load and atomic commit for one entity class.
///
/// `load_scope` returns `None` when the scope itself is unknown; the engine
/// turns that into a zero-result pass. The vec it returns is a private copy:
/// the engine mutates it and hands it back to `commit_scope`, which must
/// replace the scope's set atomically or fail without side effects.
#[async_trait]
pub trait EntityStore<E: Send>: Send + Sync {
    /// Loads the full entity set for `scope`, or `None` for an unknown scope.
    async fn load_scope(&self, scope: ScopeId) -> StoreResult<Option<Vec<E>>>;

    /// Atomically replaces the entity set for `scope`.
    async fn commit_scope(&self, scope: ScopeId, entities: Vec<E>) -> StoreResult<()>;
}

/// In-memory store for tests and embedded use.
///
/// Clones share the underlying map, so a cloned handle observes commits made
/// through the original.
#[derive(Debug)]
pub struct MemoryStore<E> {
    scopes: Arc<RwLock<HashMap<ScopeId, Vec<E>>>>,
}

impl<E> MemoryStore<E> {
    /// Creates an empty store with no scopes registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a scope so passes against it stop being no-ops.
    pub async fn create_scope(&self, scope: ScopeId) {
        self.scopes.write().await.entry(scope).or_default();
    }

    /// Seeds a scope with entities, replacing whatever was there.
    pub async fn seed(&self, scope: ScopeId, entities: Vec<E>) {
        self.scopes.write().await.insert(scope, entities);
    }

    /// Number of registered scopes.
    pub async fn scope_count(&self) -> usize {
        self.scopes.read().await.len()
    }
}

impl<E: Clone> MemoryStore<E> {
    /// Current entity set for a scope, or `None` for an unknown scope.
    pub async fn entities(&self, scope: ScopeId) -> Option<Vec<E>> {
        self.scopes.read().await.get(&scope).cloned()
    }
}

impl<E> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for MemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            scopes: Arc::clone(&self.scopes),
        }
    }
}

#[async_trait]
impl<E: Clone + Send + Sync> EntityStore<E> for MemoryStore<E> {
    async fn load_scope(&self, scope: ScopeId) -> StoreResult<Option<Vec<E>>> {
        Ok(self.scopes.read().await.get(&scope).cloned())
    }

    async fn commit_scope(&self, scope: ScopeId, entities: Vec<E>) -> StoreResult<()> {
        let mut scopes = self.scopes.write().await;
        match scopes.get_mut(&scope) {
            Some(slot) => {
                *slot = entities;
                Ok(())
            }
            None => Err(StoreError::commit_failed(scope, "scope vanished before commit")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_scope_loads_none() {
        let store: MemoryStore<String> = MemoryStore::new();
        assert!(store.load_scope(ScopeId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_created_scope_loads_empty_set() {
        let store: MemoryStore<String> = MemoryStore::new();
        let scope = ScopeId::new();
        store.create_scope(scope).await;
        assert_eq!(store.load_scope(scope).await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_commit_replaces_scope_set() {
        let store: MemoryStore<String> = MemoryStore::new();
        let scope = ScopeId::new();
        store.seed(scope, vec!["old".to_string()]).await;

        store
            .commit_scope(scope, vec!["new".to_string(), "newer".to_string()])
            .await
            .unwrap();
        assert_eq!(
            store.entities(scope).await.unwrap(),
            vec!["new".to_string(), "newer".to_string()]
        );
    }

    #[tokio::test]
    async fn test_commit_to_unknown_scope_fails() {
        let store: MemoryStore<String> = MemoryStore::new();
        let err = store
            .commit_scope(ScopeId::new(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CommitFailed { .. }));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store: MemoryStore<String> = MemoryStore::new();
        let scope = ScopeId::new();
        let handle = store.clone();
        handle.create_scope(scope).await;
        assert_eq!(store.scope_count().await, 1);
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::unavailable("down").is_transient());
        assert!(StoreError::commit_failed(ScopeId::new(), "conflict").is_transient());
        assert!(!StoreError::corrupt("bad row").is_transient());
    }
}
