//! EvaluateExpressionHandler - Command handler for evaluating one tree.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::EvaluationConfig;
use crate::domain::distribution::{DistributionView, OutcomeDistribution};
use crate::domain::evaluator::{EvaluationStats, Evaluator};
use crate::domain::expression::Expr;
use crate::domain::foundation::DomainError;
use crate::ports::DistributionCache;

/// Command to evaluate an expression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateExpressionCommand {
    /// Tree to evaluate, as supplied by a rule catalog.
    pub expression: Expr,
}

/// Result of a successful evaluation.
#[derive(Debug, Clone)]
pub struct EvaluateExpressionResult {
    /// The exact distribution.
    pub distribution: OutcomeDistribution,
    /// Memo and cache counters for the call.
    pub stats: EvaluationStats,
}

impl EvaluateExpressionResult {
    /// Ordered view for charts and reports.
    pub fn view(&self) -> DistributionView {
        self.distribution.view()
    }

    /// Returns true if a bounded operator truncated the result.
    pub fn is_truncated(&self) -> bool {
        self.distribution.is_truncated()
    }
}

/// Handler for evaluating expressions.
#[derive(Debug, Clone)]
pub struct EvaluateExpressionHandler {
    evaluator: Evaluator,
}

impl EvaluateExpressionHandler {
    pub fn new(evaluator: Evaluator) -> Self {
        Self { evaluator }
    }

    /// Builds the evaluator from configuration, attaching `cache` only when
    /// `shared_cache` is enabled.
    pub fn from_config(config: &EvaluationConfig, cache: Arc<dyn DistributionCache>) -> Self {
        Self::new(evaluator_from_config(config, cache))
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn handle(
        &self,
        cmd: EvaluateExpressionCommand,
    ) -> Result<EvaluateExpressionResult, DomainError> {
        let (distribution, stats) = self.evaluator.evaluate_with_stats(&cmd.expression)?;
        Ok(EvaluateExpressionResult {
            distribution,
            stats,
        })
    }
}

/// Builds an evaluator honouring the configured limits and cache switch.
pub fn evaluator_from_config(
    config: &EvaluationConfig,
    cache: Arc<dyn DistributionCache>,
) -> Evaluator {
    let evaluator = Evaluator::new(config.limits());
    if config.shared_cache {
        evaluator.with_shared_cache(cache)
    } else {
        evaluator
    }
}
