//! Reroll and explode, evaluated exactly up to a caller-supplied bound.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::collections::BTreeMap;
use tracing::warn;

use crate::domain::distribution::{OutcomeDistribution, TaggedOutcome};
use crate::domain::expression::Predicate;
use crate::domain::foundation::{
    BoundedOperator, DomainError, Probability, TruncationWarning,
};

use super::EvaluationLimits;

/// Rerolls matching outcomes at most `max_attempts` times.
///
/// With `T` the child total and `M` the matching mass, a non-matching outcome
/// `x` ends with weight `c(x) * sum(M^i * T^(N-i), i = 0..=N)` and a matching
/// outcome keeps `c(x) * M^N`: it is what the final allowed roll showed. The
/// total becomes `T^(N+1)`, and `(M/T)^(N+1)` is the mass that would have
/// rerolled again. Tags follow the roll that stands.
pub(crate) fn reroll(
    dist: &OutcomeDistribution,
    predicate: &Predicate,
    max_attempts: u32,
) -> OutcomeDistribution {
    let matching = dist.count_where(|outcome| predicate.matches(outcome, dist));
    if max_attempts == 0 || matching.is_zero() {
        return dist.clone();
    }

    let total = dist.total_count();
    let mut series = BigUint::one();
    let mut matching_power = BigUint::one();
    for _ in 0..max_attempts {
        matching_power *= &matching;
        series = series * total + &matching_power;
    }

    let counts: BTreeMap<TaggedOutcome, BigUint> = dist
        .joint_counts()
        .iter()
        .map(|(key, count)| {
            let weight = if predicate.matches(key.value, dist) {
                count * &matching_power
            } else {
                count * &series
            };
            (key.clone(), weight)
        })
        .collect();
    let new_total = num_traits::pow(total.clone(), max_attempts as usize + 1);
    let residual = Probability::from_counts(&(matching_power * &matching), &new_total);

    let warning = TruncationWarning::new(BoundedOperator::Reroll, max_attempts, residual);
    warn!(
        operator = "reroll",
        bound = max_attempts,
        residual = %warning.residual,
        "Bounded operator truncated"
    );
    OutcomeDistribution::from_tagged(counts, new_total, dist.truncation_warnings().to_vec())
        .with_truncation(warning)
}

/// Adds another roll when the predicate holds, at most `max_depth` times.
///
/// Tier `E_0` is the child itself; tier `E_d` rolls the child and, on a
/// matching outcome, adds an independent roll drawn from `E_(d-1)`. The
/// predicate is always resolved against the child, so "explode on the
/// maximum face" keeps meaning the child's maximum at every depth. Tags of
/// every roll in the chain are added together.
pub(crate) fn explode(
    dist: &OutcomeDistribution,
    predicate: &Predicate,
    max_depth: u32,
    limits: &EvaluationLimits,
) -> Result<OutcomeDistribution, DomainError> {
    let joint = dist.joint_counts();
    let faces: Vec<(&TaggedOutcome, &BigUint, bool)> = joint
        .iter()
        .map(|(key, count)| (key, count, predicate.matches(key.value, dist)))
        .collect();
    let matching: BigUint = faces
        .iter()
        .filter(|(_, _, matches)| *matches)
        .map(|(_, count, _)| *count)
        .sum();
    if max_depth == 0 || matching.is_zero() {
        return Ok(dist.clone());
    }

    let total = dist.total_count();
    let mut tier_counts = (*joint).clone();
    let mut tier_total = total.clone();
    for _ in 0..max_depth {
        let mut next: BTreeMap<TaggedOutcome, BigUint> = BTreeMap::new();
        for &(face, count, matches) in &faces {
            if !matches {
                *next.entry(face.clone()).or_default() += count * &tier_total;
                continue;
            }
            for (extra, extra_count) in &tier_counts {
                let value = face
                    .value
                    .checked_add(extra.value)
                    .ok_or_else(|| DomainError::overflow("explosion"))?;
                let key = TaggedOutcome::new(value, face.tags.merged(&extra.tags));
                *next.entry(key).or_default() += count * extra_count;
            }
        }
        limits.check_len(next.len())?;
        tier_total = total * &tier_total;
        tier_counts = next;
    }

    let depth = max_depth as usize + 1;
    let residual = Probability::from_counts(
        &num_traits::pow(matching, depth),
        &num_traits::pow(total.clone(), depth),
    );
    let warning = TruncationWarning::new(BoundedOperator::Explode, max_depth, residual);
    warn!(
        operator = "explode",
        bound = max_depth,
        residual = %warning.residual,
        "Bounded operator truncated"
    );
    Ok(
        OutcomeDistribution::from_tagged(tier_counts, tier_total, dist.truncation_warnings().to_vec())
            .with_truncation(warning),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d6() -> OutcomeDistribution {
        OutcomeDistribution::uniform(6).unwrap()
    }

    #[test]
    fn reroll_zero_attempts_is_identity() {
        let result = reroll(&d6(), &Predicate::equals(1), 0);
        assert_eq!(result, d6());
        assert!(!result.is_truncated());
    }

    #[test]
    fn reroll_ones_once() {
        // A 1 is rerolled once; the second roll stands.
        let result = reroll(&d6(), &Predicate::equals(1), 1);
        assert_eq!(result.probability_of(1), Probability::ratio(1, 36));
        assert_eq!(result.probability_of(2), Probability::ratio(7, 36));
        assert!(result.total_probability().is_one());

        let warning = &result.truncation_warnings()[0];
        assert_eq!(warning.operator, BoundedOperator::Reroll);
        assert_eq!(warning.bound, 1);
        assert_eq!(warning.residual, Probability::ratio(1, 36));
    }

    #[test]
    fn reroll_converges_toward_conditional_distribution() {
        let result = reroll(&d6(), &Predicate::at_most(2), 3);
        // (1/6) * (1 + 1/3 + 1/9 + 1/27) per face that is kept
        assert_eq!(result.probability_of(6), Probability::ratio(20, 81));
        assert_eq!(result.probability_of(1), Probability::ratio(1, 162));
        assert!(result.total_probability().is_one());
    }

    #[test]
    fn reroll_unmatched_predicate_is_identity() {
        let result = reroll(&d6(), &Predicate::equals(9), 4);
        assert_eq!(result, d6());
    }

    #[test]
    fn explode_zero_depth_is_identity() {
        let limits = EvaluationLimits::default();
        let result = explode(&d6(), &Predicate::Maximum, 0, &limits).unwrap();
        assert_eq!(result, d6());
        assert!(!result.is_truncated());
    }

    #[test]
    fn explode_once_on_six() {
        let limits = EvaluationLimits::default();
        let result = explode(&d6(), &Predicate::Maximum, 1, &limits).unwrap();
        assert_eq!(result.probability_of(6), Probability::zero());
        assert_eq!(result.probability_of(5), Probability::ratio(1, 6));
        assert_eq!(result.probability_of(7), Probability::ratio(1, 36));
        assert_eq!(result.max_outcome(), 12);
        assert!(result.total_probability().is_one());
        assert_eq!(
            result.truncation_warnings()[0].residual,
            Probability::ratio(1, 36)
        );
    }

    #[test]
    fn explode_depth_two_reaches_eighteen() {
        let limits = EvaluationLimits::default();
        let result = explode(&d6(), &Predicate::Maximum, 2, &limits).unwrap();
        assert_eq!(result.max_outcome(), 18);
        assert_eq!(result.probability_of(18), Probability::ratio(1, 216));
        assert_eq!(result.probability_of(13), Probability::ratio(1, 216));
        assert_eq!(
            result.truncation_warnings()[0].residual,
            Probability::ratio(1, 216)
        );
    }

    #[test]
    fn explode_adds_tags_along_the_chain() {
        let marked = d6()
            .try_map_tagged(|key| {
                Ok(if key.value == 6 {
                    TaggedOutcome::new(6, key.tags.with_added("six"))
                } else {
                    key.clone()
                })
            })
            .unwrap();
        let limits = EvaluationLimits::default();
        let result = explode(&marked, &Predicate::Maximum, 1, &limits).unwrap();
        assert_eq!(
            result.probability_where_tagged(|value, tags| value == 12 && tags.count("six") == 2),
            Probability::ratio(1, 36)
        );
        assert_eq!(
            result.probability_where_tagged(|value, tags| value == 7 && tags.count("six") == 1),
            Probability::ratio(1, 36)
        );
        assert_eq!(result.tag_probability("six"), Probability::ratio(1, 6));
    }

    #[test]
    fn reroll_keeps_tags_of_the_standing_roll() {
        let marked = d6()
            .try_map_tagged(|key| Ok(TaggedOutcome::new(key.value, key.tags.with_added("rolled"))))
            .unwrap();
        let result = reroll(&marked, &Predicate::equals(1), 1);
        assert_eq!(result.tag_probability("rolled"), Probability::one());
        assert_eq!(result.probability_of(1), Probability::ratio(1, 36));
    }

    #[test]
    fn explode_respects_outcome_limit() {
        let limits = EvaluationLimits::new(10, 64);
        assert!(explode(&d6(), &Predicate::Maximum, 2, &limits).is_err());
    }
}
