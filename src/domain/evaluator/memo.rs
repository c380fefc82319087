//! Per-call memo arena keyed by structural node identity.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::distribution::OutcomeDistribution;
use crate::domain::expression::Expr;

/// Distributions computed during one `evaluate` call.
///
/// Borrowed keys tie the arena's lifetime to the tree being evaluated, so the
/// memo cannot outlive the call that created it.
#[derive(Debug, Default)]
pub(crate) struct EvaluationMemo<'a> {
    entries: HashMap<&'a Expr, Arc<OutcomeDistribution>>,
    hits: usize,
}

impl<'a> EvaluationMemo<'a> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Looks up a previously evaluated subtree, counting the hit.
    pub(crate) fn get(&mut self, expr: &Expr) -> Option<Arc<OutcomeDistribution>> {
        let found = self.entries.get(expr).cloned();
        if found.is_some() {
            self.hits += 1;
        }
        found
    }

    pub(crate) fn insert(&mut self, expr: &'a Expr, dist: Arc<OutcomeDistribution>) {
        self.entries.insert(expr, dist);
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
