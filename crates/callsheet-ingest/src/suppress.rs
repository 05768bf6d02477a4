//! Suppression: field-driven withdrawal of visited entities.

/// Decides whether a source record marks its entity withdrawn even though the
/// key is still published (for example a sentinel cancelled category on a
/// person).
///
/// The engine evaluates the policy every pass for every visited record,
/// creations included, so an entity created from an already-suppressed record
/// starts out invisible.
pub trait SuppressionPolicy<R>: Send + Sync {
    /// Whether `record` marks its entity withdrawn.
    fn is_suppressed(&self, record: &R) -> bool;
}

/// Policy for entity classes that are never suppressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuppression;

impl<R> SuppressionPolicy<R> for NoSuppression {
    fn is_suppressed(&self, _record: &R) -> bool {
        false
    }
}

/// Closures work as ad-hoc policies.
impl<R, F> SuppressionPolicy<R> for F
where
    F: Fn(&R) -> bool + Send + Sync,
{
    fn is_suppressed(&self, record: &R) -> bool {
        self(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_suppression_never_fires() {
        let policy = NoSuppression;
        assert!(!policy.is_suppressed(&"anything"));
    }

    #[test]
    fn test_closure_policy() {
        let policy = |record: &i32| *record < 0;
        assert!(policy.is_suppressed(&-1));
        assert!(!policy.is_suppressed(&1));
    }
}
