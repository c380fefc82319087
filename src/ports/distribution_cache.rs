//! DistributionCache port - Interface for sharing evaluated subtrees.
//!
//! The evaluator's own memo lives for one call. When many trees are
//! evaluated concurrently (a batch of character builds, say), the same
//! subtrees recur across calls, so callers may hand the evaluator a shared
//! cache as well.
//!
//! ## Contract
//!
//! - Read-through: the evaluator asks before computing a node.
//! - Write-once: the first value stored for a key wins; later inserts return
//!   the stored value unchanged.
//! - Never invalidated: a distribution depends only on the structure of its
//!   tree, so a stored value stays correct forever.

use std::sync::Arc;

use crate::domain::distribution::OutcomeDistribution;
use crate::domain::expression::Expr;

/// Port for a process-wide cache of evaluated expression trees.
///
/// Implementations must be safe to share across threads.
pub trait DistributionCache: Send + Sync {
    /// Returns the stored distribution for a structurally equal tree.
    fn get(&self, key: &Expr) -> Option<Arc<OutcomeDistribution>>;

    /// Stores `dist` unless the key is already present.
    ///
    /// Returns the value held by the cache after the call, which is the
    /// earlier value when another evaluation got there first.
    fn insert(&self, key: Expr, dist: Arc<OutcomeDistribution>) -> Arc<OutcomeDistribution>;

    /// Number of stored trees.
    fn len(&self) -> usize;

    /// Returns true if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal implementation to exercise the trait contract.
    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<Expr, Arc<OutcomeDistribution>>>,
    }

    impl DistributionCache for MapCache {
        fn get(&self, key: &Expr) -> Option<Arc<OutcomeDistribution>> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn insert(&self, key: Expr, dist: Arc<OutcomeDistribution>) -> Arc<OutcomeDistribution> {
            self.entries
                .lock()
                .unwrap()
                .entry(key)
                .or_insert(dist)
                .clone()
        }

        fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }
    }

    #[test]
    fn first_insert_wins() {
        let cache = MapCache::default();
        assert!(cache.is_empty());

        let first = Arc::new(OutcomeDistribution::uniform(6).unwrap());
        let second = Arc::new(OutcomeDistribution::constant(1));
        cache.insert(Expr::die(6), first.clone());
        let held = cache.insert(Expr::die(6), second);

        assert!(Arc::ptr_eq(&held, &first));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_is_object_safe() {
        let cache: Arc<dyn DistributionCache> = Arc::new(MapCache::default());
        assert!(cache.get(&Expr::die(4)).is_none());
    }
}
