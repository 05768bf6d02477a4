//! Engine error taxonomy.

use crate::store::StoreError;
use callsheet_core::ScopeId;
use callsheet_feed::FeedError;
use thiserror::Error;

/// Result alias for engine operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors aborting a reconciliation pass.
///
/// A failed pass commits nothing. Callers retry transient failures with a
/// fresh snapshot; a pass never resumes from the middle.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Persistence failed while loading or committing the scope.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The upstream snapshot could not be fetched.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The pass was cancelled between records, before commit.
    #[error("Reconciliation cancelled for scope {scope}")]
    Cancelled {
        /// Scope whose pass was cancelled
        scope: ScopeId,
    },
}

impl ReconcileError {
    /// Whether retrying the whole pass may succeed without intervention.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Store(err) => err.is_transient(),
            Self::Feed(err) => err.is_transient(),
            Self::Cancelled { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_pass_through_transparent() {
        let err = ReconcileError::from(StoreError::unavailable("connection pool exhausted"));
        assert_eq!(err.to_string(), "Store unavailable: connection pool exhausted");
        assert!(err.is_transient());
    }

    #[test]
    fn test_feed_errors_pass_through_transparent() {
        let err = ReconcileError::from(FeedError::malformed("truncated roster"));
        assert_eq!(err.to_string(), "Malformed payload: truncated roster");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_cancellation_is_not_transient() {
        let err = ReconcileError::Cancelled {
            scope: ScopeId::new(),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().starts_with("Reconciliation cancelled"));
    }
}
