//! AggregateExpressionsHandler - Folds several independent trees into one.

use serde::{Deserialize, Serialize};

use crate::domain::analysis::{InteractionAnalyzer, Reducer};
use crate::domain::distribution::{Outcome, OutcomeDistribution};
use crate::domain::evaluator::Evaluator;
use crate::domain::expression::Expr;
use crate::domain::foundation::{DomainError, Probability};

/// Command to aggregate independent trees, e.g. the damage of three attacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateExpressionsCommand {
    pub expressions: Vec<Expr>,
    pub reducer: Reducer,
    /// When set, also report the probability of exceeding this value.
    #[serde(default)]
    pub threshold: Option<Outcome>,
}

/// Result of an aggregation.
#[derive(Debug, Clone)]
pub struct AggregateExpressionsResult {
    pub distribution: OutcomeDistribution,
    /// P(reduced value > threshold), when a threshold was given.
    pub exceeds_threshold: Option<Probability>,
}

/// Handler for aggregation.
#[derive(Debug, Clone)]
pub struct AggregateExpressionsHandler {
    evaluator: Evaluator,
    analyzer: InteractionAnalyzer,
}

impl AggregateExpressionsHandler {
    /// The fold is held to the evaluator's limits.
    pub fn new(evaluator: Evaluator) -> Self {
        let analyzer = InteractionAnalyzer::new(*evaluator.limits());
        Self {
            evaluator,
            analyzer,
        }
    }

    pub fn handle(
        &self,
        cmd: AggregateExpressionsCommand,
    ) -> Result<AggregateExpressionsResult, DomainError> {
        let distributions = cmd
            .expressions
            .iter()
            .map(|expr| self.evaluator.evaluate(expr))
            .collect::<Result<Vec<_>, _>>()?;

        let distribution = self.analyzer.aggregate(&distributions, cmd.reducer)?;
        let exceeds_threshold = cmd
            .threshold
            .map(|threshold| distribution.probability_where(|outcome| outcome > threshold));

        Ok(AggregateExpressionsResult {
            distribution,
            exceeds_threshold,
        })
    }
}
