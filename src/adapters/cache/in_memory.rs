//! In-memory distribution cache for sharing subtrees across evaluations.
//!
//! Suitable for a single process evaluating many rule sets at once, e.g. a
//! batch of character builds on the rayon pool. Nothing is persisted.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::distribution::OutcomeDistribution;
use crate::domain::expression::Expr;
use crate::ports::DistributionCache;

/// Hit and miss counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Write-once cache keyed by expression structure.
///
/// Readers never block each other. Values are never replaced or evicted,
/// which keeps concurrent evaluations consistent: every thread sees the
/// same `Arc` for the same tree.
#[derive(Debug, Default)]
pub struct InMemoryDistributionCache {
    entries: RwLock<HashMap<Expr, Arc<OutcomeDistribution>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryDistributionCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl DistributionCache for InMemoryDistributionCache {
    fn get(&self, key: &Expr) -> Option<Arc<OutcomeDistribution>> {
        let found = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn insert(&self, key: Expr, dist: Arc<OutcomeDistribution>) -> Arc<OutcomeDistribution> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(dist)
            .clone()
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
