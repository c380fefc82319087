//! Interaction Analyzer - comparisons, margins, and aggregates of
//! independent distributions.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::distribution::{Outcome, OutcomeDistribution};
use crate::domain::evaluator::EvaluationLimits;
use crate::domain::expression::ComparisonOperator;
use crate::domain::foundation::{DomainError, Probability, ValidationError};

use super::{ComparisonResult, InteractionResult, OpposedDistribution, Reducer, TiePolicy};

/// Interaction analysis over independent distributions.
///
/// Nothing here chooses a tie rule on the caller's behalf. Margins and
/// aggregates are held to the same support ceiling as evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionAnalyzer {
    limits: EvaluationLimits,
}

impl InteractionAnalyzer {
    pub fn new(limits: EvaluationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &EvaluationLimits {
        &self.limits
    }

    /// Distribution over {1, 0} of whether `a <operator> b` holds.
    ///
    /// # Edge Cases
    /// - Deterministic `a` against itself: `Greater` never holds,
    ///   `GreaterOrEqual` always does
    /// - Ties count toward whichever side the operator puts them on
    pub fn compare(
        &self,
        a: &OutcomeDistribution,
        b: &OutcomeDistribution,
        operator: ComparisonOperator,
    ) -> ComparisonResult {
        let distribution = a.convolve_with(b, |x, y| i64::from(operator.holds(x, y)));
        ComparisonResult {
            operator,
            distribution,
        }
    }

    /// Distribution of `a - b`.
    ///
    /// # Errors
    /// - `ARITHMETIC_OVERFLOW` if a negation or difference leaves the `i64` range
    /// - `OUTCOME_LIMIT_EXCEEDED` if the margin has too many outcomes
    pub fn margin(
        &self,
        a: &OutcomeDistribution,
        b: &OutcomeDistribution,
    ) -> Result<OutcomeDistribution, DomainError> {
        let negated = b.try_map(|y| y.checked_neg().ok_or_else(|| DomainError::overflow("negation")))?;
        let margin = a.try_convolve_with(&negated, |x, y| {
            x.checked_add(y)
                .ok_or_else(|| DomainError::overflow("margin"))
        })?;
        self.limits
            .check_support(&margin)
            .map_err(|err| err.with_detail("operation", "margin"))?;
        Ok(margin)
    }

    /// Folds independent distributions under `reducer`.
    ///
    /// Neighbours are combined in rounds, and each round runs its pairs in
    /// parallel.
    ///
    /// # Errors
    /// - `INVALID_DISTRIBUTION` for an empty input
    /// - `ARITHMETIC_OVERFLOW` if a sum leaves the `i64` range
    /// - `OUTCOME_LIMIT_EXCEEDED` if any partial result has too many outcomes
    pub fn aggregate(
        &self,
        distributions: &[OutcomeDistribution],
        reducer: Reducer,
    ) -> Result<OutcomeDistribution, DomainError> {
        let (first, rest) = distributions
            .split_first()
            .ok_or(ValidationError::NoDistributions {
                operation: "aggregate",
            })?;
        if rest.is_empty() {
            return Ok(first.clone());
        }

        debug!(
            inputs = distributions.len(),
            reducer = ?reducer,
            "Aggregating distributions"
        );
        let mut round: Vec<OutcomeDistribution> = distributions
            .par_chunks(2)
            .map(|pair| combine_pair(pair, reducer, &self.limits))
            .collect::<Result<_, _>>()?;
        while round.len() > 1 {
            round = round
                .par_chunks(2)
                .map(|pair| combine_pair(pair, reducer, &self.limits))
                .collect::<Result<_, _>>()?;
        }
        round.pop().ok_or_else(|| {
            ValidationError::NoDistributions {
                operation: "aggregate",
            }
            .into()
        })
    }

    /// Probability that the reduced value is strictly above `threshold`.
    pub fn exceeds(
        &self,
        distributions: &[OutcomeDistribution],
        reducer: Reducer,
        threshold: Outcome,
    ) -> Result<Probability, DomainError> {
        let reduced = self.aggregate(distributions, reducer)?;
        Ok(reduced.probability_where(|outcome| outcome > threshold))
    }

    /// Resolves an opposed roll of `a` against `b` under `policy`.
    ///
    /// # Errors
    /// - `INVALID_DISTRIBUTION` when `policy` is `Reroll` and every pair ties
    /// - `ARITHMETIC_OVERFLOW` from the margin computation
    pub fn opposed(
        &self,
        a: &OutcomeDistribution,
        b: &OutcomeDistribution,
        policy: TiePolicy,
    ) -> Result<OpposedDistribution, DomainError> {
        let margin = self.margin(a, b)?;
        Self::resolve(&margin, policy)
    }

    /// Full interaction report of `a` against `b`.
    pub fn interact(
        &self,
        a: &OutcomeDistribution,
        b: &OutcomeDistribution,
        policy: TiePolicy,
    ) -> Result<InteractionResult, DomainError> {
        let margin = self.margin(a, b)?;
        let opposed = Self::resolve(&margin, policy)?;
        debug!(
            outcomes = margin.len(),
            policy = policy.label(),
            "Interaction analyzed"
        );
        Ok(InteractionResult {
            win_probability: margin.probability_where(|m| m > 0),
            loss_probability: margin.probability_where(|m| m < 0),
            tie_probability: margin.probability_of(0),
            expected_margin: margin.expected_value(),
            variance_of_margin: margin.variance(),
            margin,
            opposed,
        })
    }

    fn resolve(
        margin: &OutcomeDistribution,
        policy: TiePolicy,
    ) -> Result<OpposedDistribution, DomainError> {
        let win = margin.probability_where(|m| m > 0);
        let loss = margin.probability_where(|m| m < 0);
        let tie = margin.probability_of(0);

        let (first_wins, second_wins, tie) = match policy {
            TiePolicy::FirstWins => (win + tie, loss, Probability::zero()),
            TiePolicy::SecondWins => (win, loss + tie, Probability::zero()),
            TiePolicy::KeepTie => (win, loss, tie),
            TiePolicy::Reroll => {
                if tie.is_one() {
                    return Err(ValidationError::UnresolvableTie.into());
                }
                // Rerolling ties conditions on the roll not tying.
                let decisive = tie.complement();
                (
                    win.conditioned_on(&decisive),
                    loss.conditioned_on(&decisive),
                    Probability::zero(),
                )
            }
        };
        Ok(OpposedDistribution {
            policy,
            first_wins,
            second_wins,
            tie,
            truncation: margin.truncation_warnings().to_vec(),
        })
    }
}

fn combine_pair(
    pair: &[OutcomeDistribution],
    reducer: Reducer,
    limits: &EvaluationLimits,
) -> Result<OutcomeDistribution, DomainError> {
    match pair {
        [a, b] => {
            let combined = a.try_convolve_with(b, |x, y| reducer.apply(x, y))?;
            limits
                .check_support(&combined)
                .map_err(|err| err.with_detail("operation", "aggregate"))?;
            Ok(combined)
        }
        [single] => Ok(single.clone()),
        _ => Err(ValidationError::NoDistributions {
            operation: "aggregate",
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn d(sides: u32) -> OutcomeDistribution {
        OutcomeDistribution::uniform(sides).unwrap()
    }

    fn analyzer() -> InteractionAnalyzer {
        InteractionAnalyzer::default()
    }

    fn spaced(step: i64, len: i64) -> OutcomeDistribution {
        OutcomeDistribution::from_counts((0..len).map(|i| (i * step, 1))).unwrap()
    }

    #[test]
    fn compare_deterministic_against_itself() {
        let five = OutcomeDistribution::constant(5);
        let strict = analyzer().compare(&five, &five, ComparisonOperator::Greater);
        assert!(strict.success_probability().is_zero());
        let loose = analyzer().compare(&five, &five, ComparisonOperator::GreaterOrEqual);
        assert!(loose.success_probability().is_one());
    }

    #[test]
    fn compare_d20_against_d20() {
        let result = analyzer().compare(&d(20), &d(20), ComparisonOperator::Equal);
        assert_eq!(result.success_probability(), Probability::ratio(1, 20));
        assert!(result.distribution.total_probability().is_one());
    }

    #[test]
    fn margin_expectation_is_linear() {
        let a = d(8);
        let b = d(6).convolve_with(&d(4), |x, y| x + y);
        let margin = analyzer().margin(&a, &b).unwrap();
        assert_eq!(
            margin.expected_value(),
            a.expected_value() - b.expected_value()
        );
    }

    #[test]
    fn margin_of_d6_against_d6() {
        let margin = analyzer().margin(&d(6), &d(6)).unwrap();
        assert_eq!(margin.min_outcome(), -5);
        assert_eq!(margin.max_outcome(), 5);
        assert_eq!(margin.probability_of(0), Probability::ratio(6, 36));
        assert_eq!(margin.expected_value(), BigRational::from_integer(BigInt::from(0)));
    }

    #[test]
    fn aggregate_sum_matches_convolution() {
        let dists = vec![d(6), d(6), d(6)];
        let summed = analyzer().aggregate(&dists, Reducer::Sum).unwrap();
        let expected = d(6)
            .convolve_with(&d(6), |a, b| a + b)
            .convolve_with(&d(6), |a, b| a + b);
        assert_eq!(summed, expected);
    }

    #[test]
    fn aggregate_max_of_two_d6() {
        let dists = vec![d(6), d(6)];
        let best = analyzer().aggregate(&dists, Reducer::Max).unwrap();
        assert_eq!(best.probability_of(6), Probability::ratio(11, 36));
    }

    #[test]
    fn aggregate_of_one_is_identity_and_empty_is_invalid() {
        let single = analyzer().aggregate(&[d(4)], Reducer::Min).unwrap();
        assert_eq!(single, d(4));

        let err = analyzer().aggregate(&[], Reducer::Sum).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDistribution);
    }

    #[test]
    fn exceeds_is_strict() {
        let dists = vec![d(6), d(6)];
        let p = analyzer().exceeds(&dists, Reducer::Sum, 10).unwrap();
        assert_eq!(p, Probability::ratio(3, 36));
    }

    #[test]
    fn tie_policies_redistribute_tie_mass() {
        let (a, b) = (d(6), d(6));
        let first = analyzer().opposed(&a, &b, TiePolicy::FirstWins).unwrap();
        assert_eq!(first.first_wins, Probability::ratio(21, 36));
        assert!(first.tie.is_zero());

        let second = analyzer().opposed(&a, &b, TiePolicy::SecondWins).unwrap();
        assert_eq!(second.second_wins, Probability::ratio(21, 36));

        let kept = analyzer().opposed(&a, &b, TiePolicy::KeepTie).unwrap();
        assert_eq!(kept.tie, Probability::ratio(1, 6));

        let rerolled = analyzer().opposed(&a, &b, TiePolicy::Reroll).unwrap();
        assert_eq!(rerolled.first_wins, Probability::ratio(1, 2));
        assert_eq!(rerolled.second_wins, Probability::ratio(1, 2));
    }

    #[test]
    fn reroll_of_certain_tie_is_invalid() {
        let five = OutcomeDistribution::constant(5);
        let err = analyzer().opposed(&five, &five, TiePolicy::Reroll).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDistribution);
    }

    #[test]
    fn interact_reports_named_scalars() {
        let result = analyzer().interact(&d(20), &d(12), TiePolicy::SecondWins).unwrap();
        let total = result.win_probability.clone()
            + result.loss_probability.clone()
            + result.tie_probability.clone();
        assert!(total.is_one());
        assert_eq!(
            result.expected_margin,
            d(20).expected_value() - d(12).expected_value()
        );
        assert_eq!(result.variance_of_margin, d(20).variance() + d(12).variance());
        assert!(!result.is_truncated());

        let summary = result.summary();
        assert!((summary.expected_margin - 4.0).abs() < 1e-12);
    }

    #[test]
    fn aggregate_respects_outcome_limit() {
        // 40 x 40 distinct sums, above a ceiling of 1000.
        let dists = vec![spaced(100, 40), spaced(1, 40)];
        let tight = InteractionAnalyzer::new(EvaluationLimits::new(1_000, 64));
        let err = tight.aggregate(&dists, Reducer::Sum).unwrap_err();
        assert_eq!(err.code, ErrorCode::OutcomeLimitExceeded);
        assert_eq!(err.details.get("operation").map(String::as_str), Some("aggregate"));

        let err = tight.exceeds(&dists, Reducer::Sum, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::OutcomeLimitExceeded);
        assert_eq!(analyzer().aggregate(&dists, Reducer::Sum).unwrap().len(), 1_600);
    }

    #[test]
    fn margin_respects_outcome_limit() {
        let tight = InteractionAnalyzer::new(EvaluationLimits::new(1_000, 64));
        let (a, b) = (spaced(100, 40), spaced(1, 40));
        let err = tight.margin(&a, &b).unwrap_err();
        assert_eq!(err.code, ErrorCode::OutcomeLimitExceeded);
        assert!(tight.interact(&a, &b, TiePolicy::KeepTie).is_err());
        assert!(tight.margin(&d(20), &d(20)).is_ok());
    }
}
