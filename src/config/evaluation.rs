//! Evaluation engine configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::evaluator::EvaluationLimits;

/// Resource ceilings and reuse switches for the evaluator
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EvaluationConfig {
    /// Largest number of distinct outcomes an intermediate result may hold
    #[serde(default = "default_max_outcomes")]
    pub max_outcomes: usize,

    /// Largest reroll/explode bound accepted in an expression
    #[serde(default = "default_max_bound")]
    pub max_bound: u32,

    /// Share evaluated subtrees across calls through an in-memory cache
    #[serde(default = "default_true")]
    pub shared_cache: bool,

    /// Evaluate batches on the rayon thread pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl EvaluationConfig {
    /// Limits handed to the evaluator
    pub fn limits(&self) -> EvaluationLimits {
        EvaluationLimits::new(self.max_outcomes, self.max_bound)
    }

    /// Validate evaluation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_outcomes == 0 {
            return Err(ValidationError::InvalidMaxOutcomes);
        }
        if self.max_bound == 0 {
            return Err(ValidationError::InvalidMaxBound);
        }
        Ok(())
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_outcomes: default_max_outcomes(),
            max_bound: default_max_bound(),
            shared_cache: default_true(),
            parallel: default_true(),
        }
    }
}

fn default_max_outcomes() -> usize {
    EvaluationLimits::DEFAULT_MAX_OUTCOMES
}

fn default_max_bound() -> u32 {
    EvaluationLimits::DEFAULT_MAX_BOUND
}

fn default_true() -> bool {
    true
}
