//! Resource ceilings applied while evaluating a tree.

use crate::domain::distribution::OutcomeDistribution;
use crate::domain::foundation::DomainError;

/// Caps on support size and bounded-operator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationLimits {
    /// Largest number of distinct outcomes, (value, tags) pairs, or selection
    /// states any intermediate result may hold.
    pub max_outcomes: usize,
    /// Largest `max_attempts` / `max_depth` accepted on reroll and explode.
    pub max_bound: u32,
}

impl EvaluationLimits {
    pub const DEFAULT_MAX_OUTCOMES: usize = 100_000;
    pub const DEFAULT_MAX_BOUND: u32 = 64;

    /// Creates limits with explicit ceilings.
    pub fn new(max_outcomes: usize, max_bound: u32) -> Self {
        Self {
            max_outcomes,
            max_bound,
        }
    }

    /// Fails if `dist` holds more outcomes than allowed.
    pub(crate) fn check_support(&self, dist: &OutcomeDistribution) -> Result<(), DomainError> {
        self.check_len(dist.support_size())
    }

    /// Fails if a table of `len` entries is larger than allowed.
    pub(crate) fn check_len(&self, len: usize) -> Result<(), DomainError> {
        if len > self.max_outcomes {
            return Err(DomainError::outcome_limit(self.max_outcomes, len));
        }
        Ok(())
    }
}

impl Default for EvaluationLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_OUTCOMES, Self::DEFAULT_MAX_BOUND)
    }
}
