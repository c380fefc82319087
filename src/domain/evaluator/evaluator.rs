//! Evaluator - reduces an expression tree to its exact distribution.

use num_bigint::BigUint;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::domain::distribution::{OutcomeDistribution, TaggedOutcome};
use crate::domain::expression::{BinaryOp, Expr};
use crate::domain::foundation::{DomainError, ValidationError};
use crate::ports::DistributionCache;

use super::bounded::{explode, reroll};
use super::memo::EvaluationMemo;
use super::selection::{select_identical, select_mixed, SelectionOrder};
use super::validation::validate_tree;
use super::EvaluationLimits;

/// Counters describing one evaluation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationStats {
    /// Nodes in the submitted tree.
    pub nodes: usize,
    /// Distinct subtrees computed or fetched during the call.
    pub distinct_subtrees: usize,
    /// Subtrees answered from the per-call memo.
    pub memo_hits: usize,
    /// Subtrees answered from the shared cache.
    pub shared_cache_hits: usize,
}

/// Reduces expression trees to outcome distributions.
///
/// The evaluator holds no per-call state: every `evaluate` call builds its
/// own memo and drops it on return, so one evaluator can serve many threads.
/// An optional [`DistributionCache`] extends reuse across calls.
#[derive(Clone, Default)]
pub struct Evaluator {
    limits: EvaluationLimits,
    shared_cache: Option<Arc<dyn DistributionCache>>,
}

impl Evaluator {
    /// Creates an evaluator with the given limits and no shared cache.
    pub fn new(limits: EvaluationLimits) -> Self {
        Self {
            limits,
            shared_cache: None,
        }
    }

    /// Attaches a shared read-through cache.
    pub fn with_shared_cache(mut self, cache: Arc<dyn DistributionCache>) -> Self {
        self.shared_cache = Some(cache);
        self
    }

    pub fn limits(&self) -> &EvaluationLimits {
        &self.limits
    }

    /// Evaluates `expr` to its exact distribution.
    ///
    /// # Errors
    /// - `INVALID_EXPRESSION` for structural faults, found before any work
    ///   starts, or a divisor operand that can be zero
    /// - `OUTCOME_LIMIT_EXCEEDED` when an intermediate result grows past
    ///   `max_outcomes`
    /// - `ARITHMETIC_OVERFLOW` when an outcome leaves the `i64` range
    pub fn evaluate(&self, expr: &Expr) -> Result<OutcomeDistribution, DomainError> {
        self.evaluate_with_stats(expr).map(|(dist, _)| dist)
    }

    /// Evaluates `expr` and reports memo and cache counters.
    pub fn evaluate_with_stats(
        &self,
        expr: &Expr,
    ) -> Result<(OutcomeDistribution, EvaluationStats), DomainError> {
        validate_tree(expr, &self.limits)?;

        let nodes = expr.node_count();
        debug!(nodes, depth = expr.depth(), "Evaluating expression");

        let mut session = EvaluationSession::new(self);
        let root = session.eval(expr)?;
        let stats = EvaluationStats {
            nodes,
            distinct_subtrees: session.memo.len(),
            memo_hits: session.memo.hits(),
            shared_cache_hits: session.shared_hits,
        };
        drop(session);

        let dist = Arc::try_unwrap(root).unwrap_or_else(|shared| (*shared).clone());
        debug!(
            outcomes = dist.len(),
            memo_hits = stats.memo_hits,
            shared_cache_hits = stats.shared_cache_hits,
            "Evaluation complete"
        );
        if dist.is_truncated() {
            warn!(
                warnings = dist.truncation_warnings().len(),
                "Result carries truncation warnings"
            );
        }
        Ok((dist, stats))
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("limits", &self.limits)
            .field("shared_cache", &self.shared_cache.is_some())
            .finish()
    }
}

/// State for a single `evaluate` call.
struct EvaluationSession<'e, 'a> {
    evaluator: &'e Evaluator,
    memo: EvaluationMemo<'a>,
    shared_hits: usize,
}

impl<'e, 'a> EvaluationSession<'e, 'a> {
    fn new(evaluator: &'e Evaluator) -> Self {
        Self {
            evaluator,
            memo: EvaluationMemo::new(),
            shared_hits: 0,
        }
    }

    fn limits(&self) -> &EvaluationLimits {
        &self.evaluator.limits
    }

    fn eval(&mut self, expr: &'a Expr) -> Result<Arc<OutcomeDistribution>, DomainError> {
        if let Some(hit) = self.memo.get(expr) {
            return Ok(hit);
        }

        // Leaves are cheaper to rebuild than to hash into a shared map.
        let evaluator = self.evaluator;
        let shared = evaluator
            .shared_cache
            .as_ref()
            .filter(|_| !expr.is_primitive());
        if let Some(hit) = shared.and_then(|cache| cache.get(expr)) {
            // Another evaluator may have filled the cache under looser limits.
            self.limits()
                .check_support(&hit)
                .map_err(|err| err.with_detail("operator", expr.operator_name()))?;
            self.shared_hits += 1;
            self.memo.insert(expr, hit.clone());
            return Ok(hit);
        }

        let dist = self.compute(expr)?;
        self.limits()
            .check_support(&dist)
            .map_err(|err| err.with_detail("operator", expr.operator_name()))?;
        trace!(
            operator = expr.operator_name(),
            outcomes = dist.len(),
            "Node evaluated"
        );

        let mut dist = Arc::new(dist);
        if let Some(cache) = shared {
            dist = cache.insert(expr.clone(), dist);
        }
        self.memo.insert(expr, dist.clone());
        Ok(dist)
    }

    fn compute(&mut self, expr: &'a Expr) -> Result<OutcomeDistribution, DomainError> {
        match expr {
            Expr::Constant { value } => Ok(OutcomeDistribution::constant(*value)),
            Expr::UniformDie { sides } => Ok(OutcomeDistribution::uniform(*sides)?),
            Expr::Die { faces } => {
                let mut weights: BTreeMap<_, BigUint> = BTreeMap::new();
                for face in faces {
                    *weights.entry(face.value).or_default() += face.weight;
                }
                Ok(OutcomeDistribution::from_weights(weights)?)
            }
            Expr::Sum { children } => {
                let operands = self.eval_all(children)?;
                self.sum_pairwise(operands)
            }
            Expr::Product {
                children,
                combinator,
            } => self.fold_product(children, *combinator),
            Expr::SelectHighest { keep, pool } => self.select(pool, *keep, SelectionOrder::Highest),
            Expr::SelectLowest { keep, pool } => self.select(pool, *keep, SelectionOrder::Lowest),
            Expr::Reroll {
                child,
                predicate,
                max_attempts,
            } => {
                let dist = self.eval(child)?;
                Ok(reroll(&dist, predicate, *max_attempts))
            }
            Expr::Explode {
                child,
                predicate,
                max_depth,
            } => {
                let dist = self.eval(child)?;
                explode(&dist, predicate, *max_depth, self.limits())
            }
            Expr::Map { child, transform } => {
                let dist = self.eval(child)?;
                dist.try_map(|outcome| transform.apply(outcome, &dist))
            }
            Expr::Compare {
                left,
                right,
                operator,
            } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(left.convolve_with(&right, |a, b| i64::from(operator.holds(a, b))))
            }
            Expr::Tag {
                child,
                tag,
                predicate,
            } => {
                let dist = self.eval(child)?;
                dist.try_map_tagged(|key| {
                    Ok(if predicate.matches(key.value, &dist) {
                        TaggedOutcome::new(key.value, key.tags.with_added(tag))
                    } else {
                        key.clone()
                    })
                })
            }
            Expr::TagRule {
                child,
                condition,
                transform,
            } => {
                let dist = self.eval(child)?;
                dist.try_map_tagged(|key| {
                    if condition.holds(&key.tags) {
                        let value = transform.apply(key.value, &dist)?;
                        Ok(TaggedOutcome::new(value, key.tags.clone()))
                    } else {
                        Ok(key.clone())
                    }
                })
            }
            Expr::RemoveTags { child, tags } => {
                let dist = self.eval(child)?;
                dist.try_map_tagged(|key| Ok(TaggedOutcome::new(key.value, key.tags.without(tags))))
            }
        }
    }

    fn eval_all(&mut self, children: &'a [Expr]) -> Result<Vec<Arc<OutcomeDistribution>>, DomainError> {
        children.iter().map(|child| self.eval(child)).collect()
    }

    /// Adds neighbours in rounds so intermediate tables stay balanced.
    fn sum_pairwise(
        &self,
        mut operands: Vec<Arc<OutcomeDistribution>>,
    ) -> Result<OutcomeDistribution, DomainError> {
        while operands.len() > 1 {
            let mut next = Vec::with_capacity(operands.len().div_ceil(2));
            for pair in operands.chunks(2) {
                match pair {
                    [a, b] => {
                        let combined = a.try_convolve_with(b, |x, y| BinaryOp::Add.apply(x, y))?;
                        self.limits().check_support(&combined)?;
                        next.push(Arc::new(combined));
                    }
                    [single] => next.push(single.clone()),
                    _ => {}
                }
            }
            operands = next;
        }
        operands
            .pop()
            .map(|dist| Arc::try_unwrap(dist).unwrap_or_else(|shared| (*shared).clone()))
            .ok_or_else(|| ValidationError::EmptyOperands { operator: "sum" }.into())
    }

    /// Folds the children left to right; order matters for non-commutative
    /// combinators.
    fn fold_product(
        &mut self,
        children: &'a [Expr],
        combinator: BinaryOp,
    ) -> Result<OutcomeDistribution, DomainError> {
        let operands = self.eval_all(children)?;
        let mut iter = operands.into_iter();
        let first = iter
            .next()
            .ok_or(ValidationError::EmptyOperands { operator: "product" })?;
        let mut acc = Arc::try_unwrap(first).unwrap_or_else(|shared| (*shared).clone());

        for operand in iter {
            check_right_operand(combinator, &operand)?;
            acc = acc.try_convolve_with(&operand, |a, b| combinator.apply(a, b))?;
            self.limits().check_support(&acc)?;
        }
        Ok(acc)
    }

    fn select(
        &mut self,
        pool: &'a [Expr],
        keep: usize,
        order: SelectionOrder,
    ) -> Result<OutcomeDistribution, DomainError> {
        match pool.split_first() {
            Some((first, rest)) if rest.iter().all(|die| die == first) => {
                let die = self.eval(first)?;
                select_identical(&die, pool.len(), keep, order, self.limits())
            }
            _ => {
                let dice = self.eval_all(pool)?;
                select_mixed(&dice, keep, order, self.limits())
            }
        }
    }
}

/// Rejects right-hand operands whose support makes the combinator undefined.
fn check_right_operand(combinator: BinaryOp, operand: &OutcomeDistribution) -> Result<(), DomainError> {
    if combinator.rejects_zero_divisor() && !operand.probability_of(0).is_zero() {
        return Err(ValidationError::division_by_zero(format!(
            "'{}' operand that can roll 0",
            combinator
        ))
        .into());
    }
    if combinator.rejects_negative_exponent() && operand.min_outcome() < 0 {
        return Err(ValidationError::NegativeExponent {
            exponent: operand.min_outcome(),
        }
        .into());
    }
    Ok(())
}
