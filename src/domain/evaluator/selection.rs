//! Keep-highest / keep-lowest selection over a pool of independent dice.
//!
//! Two strategies:
//! - identical pools walk the faces from most to least preferred, tracking
//!   how many dice were placed and what the kept dice add up to; a face shown
//!   by `n` of the remaining dice is weighted by a binomial coefficient, so the
//!   state table stays polynomial in the pool size;
//! - mixed pools fold the dice one at a time over the sorted list of values
//!   currently kept, so a state never holds more than `keep` entries.
//!
//! Tagged pools always take the mixed path. Every die in the pool adds its
//! tags to the result, kept or not.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::domain::distribution::{Outcome, OutcomeDistribution, TagSet, TaggedOutcome};
use crate::domain::foundation::DomainError;

use super::EvaluationLimits;

/// Which end of the pool is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectionOrder {
    Highest,
    Lowest,
}

impl SelectionOrder {
    /// Returns true if `a` is kept ahead of `b`.
    fn prefers(&self, a: Outcome, b: Outcome) -> bool {
        match self {
            SelectionOrder::Highest => a > b,
            SelectionOrder::Lowest => a < b,
        }
    }

    /// Inserts `face` into the preference-sorted `kept` list, dropping
    /// whatever falls past `keep`.
    fn admit(&self, kept: &[Outcome], face: Outcome, keep: usize) -> Vec<Outcome> {
        let position = kept
            .iter()
            .position(|&value| self.prefers(face, value))
            .unwrap_or(kept.len());
        let mut next = Vec::with_capacity(kept.len() + 1);
        next.extend_from_slice(&kept[..position]);
        next.push(face);
        next.extend_from_slice(&kept[position..]);
        next.truncate(keep);
        next
    }
}

/// Sum of the `keep` preferred results of `count` copies of `die`.
pub(crate) fn select_identical(
    die: &OutcomeDistribution,
    count: usize,
    keep: usize,
    order: SelectionOrder,
    limits: &EvaluationLimits,
) -> Result<OutcomeDistribution, DomainError> {
    if die.is_tagged() {
        let pool = vec![Arc::new(die.clone()); count];
        return select_mixed(&pool, keep, order, limits);
    }

    let mut faces: Vec<(Outcome, &BigUint)> = die.raw_counts().iter().map(|(&o, c)| (o, c)).collect();
    if order == SelectionOrder::Highest {
        faces.reverse();
    }

    // tail[i] is the mass of faces i.. (the faces no better than face i).
    let mut tail = vec![BigUint::zero(); faces.len() + 1];
    for index in (0..faces.len()).rev() {
        tail[index] = &tail[index + 1] + faces[index].1;
    }
    let binomials = pascal_triangle(count);

    // Open states are keyed by (dice placed, sum kept). Until every slot is
    // filled each placed die is kept, so the pair fixes the state.
    let mut open: HashMap<(usize, Outcome), BigUint> = HashMap::new();
    open.insert((0, 0), BigUint::one());
    let mut sums: BTreeMap<Outcome, BigUint> = BTreeMap::new();

    for (index, &(face, face_count)) in faces.iter().enumerate() {
        if open.is_empty() {
            break;
        }
        let last = index + 1 == faces.len();
        let face_powers = powers(face_count, count);
        let rest_powers = powers(&tail[index + 1], count);

        let mut next: HashMap<(usize, Outcome), BigUint> = HashMap::with_capacity(open.len());
        for (&(placed, kept), weight) in &open {
            let remaining = count - placed;
            let slots = keep - placed;
            let first_n = if last { remaining } else { 0 };
            for n in first_n..=remaining {
                let taken = n.min(slots);
                let value = Outcome::try_from(taken)
                    .ok()
                    .and_then(|taken| face.checked_mul(taken))
                    .and_then(|added| kept.checked_add(added))
                    .ok_or_else(|| DomainError::overflow("selection sum"))?;
                let weight = weight * &binomials[remaining][n] * &face_powers[n];
                if taken == slots {
                    // The dice left over may show any face not better than this one.
                    *sums.entry(value).or_default() += weight * &rest_powers[remaining - n];
                } else {
                    *next.entry((placed + n, value)).or_default() += weight;
                }
            }
        }
        limits
            .check_len(next.len())
            .map_err(|err| err.with_detail("stage", "selection states"))?;
        limits.check_len(sums.len())?;
        open = next;
    }

    let total = num_traits::pow(die.total_count().clone(), count);
    Ok(OutcomeDistribution::from_parts(
        sums,
        total,
        die.truncation_warnings().to_vec(),
    ))
}

/// Sum of the `keep` preferred results of a heterogeneous pool.
pub(crate) fn select_mixed(
    pool: &[Arc<OutcomeDistribution>],
    keep: usize,
    order: SelectionOrder,
    limits: &EvaluationLimits,
) -> Result<OutcomeDistribution, DomainError> {
    let mut states: HashMap<(Vec<Outcome>, TagSet), BigUint> = HashMap::new();
    states.insert((Vec::new(), TagSet::new()), BigUint::one());

    for die in pool {
        let faces = die.joint_counts();
        let mut next: HashMap<(Vec<Outcome>, TagSet), BigUint> = HashMap::with_capacity(states.len());
        for ((kept, tags), weight) in &states {
            for (face, count) in faces.iter() {
                let key = (order.admit(kept, face.value, keep), tags.merged(&face.tags));
                *next.entry(key).or_default() += weight * count;
            }
        }
        limits
            .check_len(next.len())
            .map_err(|err| err.with_detail("stage", "selection states"))?;
        states = next;
    }

    let mut sums: BTreeMap<TaggedOutcome, BigUint> = BTreeMap::new();
    for ((kept, tags), weight) in states {
        let sum = kept
            .iter()
            .try_fold(0 as Outcome, |acc, &value| acc.checked_add(value))
            .ok_or_else(|| DomainError::overflow("selection sum"))?;
        *sums.entry(TaggedOutcome::new(sum, tags)).or_default() += weight;
    }

    let total = pool
        .iter()
        .fold(BigUint::one(), |acc, die| acc * die.total_count());
    let result = OutcomeDistribution::from_tagged(sums, total, Vec::new());
    Ok(pool
        .iter()
        .fold(result, |acc, die| acc.inheriting_warnings(die)))
}

/// `base^0 ..= base^up_to`.
fn powers(base: &BigUint, up_to: usize) -> Vec<BigUint> {
    let mut table = Vec::with_capacity(up_to + 1);
    let mut current = BigUint::one();
    for _ in 0..up_to {
        let next = &current * base;
        table.push(current);
        current = next;
    }
    table.push(current);
    table
}

/// Rows `0..=rows` of Pascal's triangle.
fn pascal_triangle(rows: usize) -> Vec<Vec<BigUint>> {
    let mut triangle: Vec<Vec<BigUint>> = Vec::with_capacity(rows + 1);
    for row in 0..=rows {
        let mut entries = vec![BigUint::one(); row + 1];
        for k in 1..row {
            entries[k] = &triangle[row - 1][k - 1] + &triangle[row - 1][k];
        }
        triangle.push(entries);
    }
    triangle
}
