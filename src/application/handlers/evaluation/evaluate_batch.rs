//! EvaluateBatchHandler - Evaluates many independent trees at once.
//!
//! Trees share nothing but the optional distribution cache, so the batch
//! fans out over the rayon pool. One failing tree does not abort the rest.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EvaluationConfig;
use crate::domain::evaluator::Evaluator;
use crate::domain::expression::Expr;
use crate::domain::foundation::DomainError;

use super::EvaluateExpressionResult;

/// One labelled tree in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedExpression {
    /// Caller-chosen label, e.g. "longsword damage".
    pub label: String,
    pub expression: Expr,
}

impl NamedExpression {
    pub fn new(label: impl Into<String>, expression: Expr) -> Self {
        Self {
            label: label.into(),
            expression,
        }
    }
}

/// Command to evaluate a batch of trees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateBatchCommand {
    pub expressions: Vec<NamedExpression>,
}

/// Outcome of one tree in a batch.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub label: String,
    pub outcome: Result<EvaluateExpressionResult, DomainError>,
}

/// Result of a batch, in submission order.
#[derive(Debug, Clone, Default)]
pub struct EvaluateBatchResult {
    pub entries: Vec<BatchEntry>,
}

impl EvaluateBatchResult {
    /// Entries that evaluated successfully.
    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &EvaluateExpressionResult)> {
        self.entries.iter().filter_map(|entry| {
            entry
                .outcome
                .as_ref()
                .ok()
                .map(|result| (entry.label.as_str(), result))
        })
    }

    /// Entries that failed, with their errors.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &DomainError)> {
        self.entries.iter().filter_map(|entry| {
            entry
                .outcome
                .as_ref()
                .err()
                .map(|err| (entry.label.as_str(), err))
        })
    }

    /// Looks up an entry by label.
    pub fn get(&self, label: &str) -> Option<&BatchEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }
}

/// Handler for batch evaluation.
#[derive(Debug, Clone)]
pub struct EvaluateBatchHandler {
    evaluator: Evaluator,
    parallel: bool,
}

impl EvaluateBatchHandler {
    pub fn new(evaluator: Evaluator, parallel: bool) -> Self {
        Self {
            evaluator,
            parallel,
        }
    }

    /// Uses the `parallel` switch from configuration.
    pub fn from_config(evaluator: Evaluator, config: &EvaluationConfig) -> Self {
        Self::new(evaluator, config.parallel)
    }

    pub fn handle(&self, cmd: EvaluateBatchCommand) -> EvaluateBatchResult {
        debug!(
            size = cmd.expressions.len(),
            parallel = self.parallel,
            "Evaluating batch"
        );

        let entries: Vec<BatchEntry> = if self.parallel {
            cmd.expressions
                .into_par_iter()
                .map(|named| self.evaluate_one(named))
                .collect()
        } else {
            cmd.expressions
                .into_iter()
                .map(|named| self.evaluate_one(named))
                .collect()
        };

        let result = EvaluateBatchResult { entries };
        for (label, err) in result.failed() {
            warn!(label, error = %err, "Batch entry failed");
        }
        result
    }

    fn evaluate_one(&self, named: NamedExpression) -> BatchEntry {
        let outcome = self
            .evaluator
            .evaluate_with_stats(&named.expression)
            .map(|(distribution, stats)| EvaluateExpressionResult {
                distribution,
                stats,
            });
        BatchEntry {
            label: named.label,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, Probability};

    fn batch() -> EvaluateBatchCommand {
        EvaluateBatchCommand {
            expressions: vec![
                NamedExpression::new("greatsword", Expr::dice(2, Expr::die(6)) + 3),
                NamedExpression::new("broken", Expr::die(0)),
                NamedExpression::new("stat roll", Expr::keep_highest(3, 4, Expr::die(6))),
            ],
        }
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let parallel = EvaluateBatchHandler::new(Evaluator::default(), true).handle(batch());
        let sequential = EvaluateBatchHandler::new(Evaluator::default(), false).handle(batch());

        let labels: Vec<_> = parallel.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["greatsword", "broken", "stat roll"]);

        for (a, b) in parallel.succeeded().zip(sequential.succeeded()) {
            assert_eq!(a.0, b.0);
            assert_eq!(a.1.distribution, b.1.distribution);
        }
    }

    #[test]
    fn failures_are_isolated() {
        let result = EvaluateBatchHandler::new(Evaluator::default(), true).handle(batch());
        assert_eq!(result.succeeded().count(), 2);

        let failed: Vec<_> = result.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "broken");
        assert_eq!(failed[0].1.code, ErrorCode::InvalidExpression);
    }

    #[test]
    fn lookup_by_label() {
        let result = EvaluateBatchHandler::new(Evaluator::default(), false).handle(batch());
        let greatsword = result.get("greatsword").unwrap().outcome.as_ref().unwrap();
        assert_eq!(greatsword.distribution.min_outcome(), 5);
        assert_eq!(greatsword.distribution.probability_of(10), Probability::ratio(1, 6));
        assert!(result.get("missing").is_none());
    }

    #[test]
    fn empty_batch_is_empty() {
        let result = EvaluateBatchHandler::new(Evaluator::default(), true)
            .handle(EvaluateBatchCommand::default());
        assert!(result.entries.is_empty());
    }
}
