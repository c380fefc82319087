//! Outcome Distribution - exact probability mass over integer outcomes.

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::domain::foundation::{DomainError, Probability, TruncationWarning, ValidationError};

use super::{DistributionView, OutcomeProbability, TagSet, TaggedOutcome, TaggedProbability};

/// A single value a dice expression can produce.
pub type Outcome = i64;

/// Immutable mapping from outcome to exact probability.
///
/// Mass is stored as integer counts over a shared total, so the total is the
/// number of equally-likely elementary outcomes that were considered. Every
/// stored count is strictly positive and the counts always sum to the total.
///
/// Outcomes may also carry [`TagSet`]s. The per-value counts are then the
/// marginal of a joint (value, tags) table, which is only kept while at least
/// one outcome is tagged.
#[derive(Debug, Clone)]
pub struct OutcomeDistribution {
    counts: BTreeMap<Outcome, BigUint>,
    total: BigUint,
    truncation: Vec<TruncationWarning>,
    tagged: Option<BTreeMap<TaggedOutcome, BigUint>>,
}

impl OutcomeDistribution {
    /// Builds a distribution from outcome counts.
    ///
    /// Repeated outcomes are summed and zero counts are dropped.
    ///
    /// # Errors
    /// - `NegativeCount` if any count is negative
    /// - `ZeroTotal` if the counts sum to zero
    pub fn from_counts<I>(counts: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (Outcome, i64)>,
    {
        let mut merged: BTreeMap<Outcome, BigUint> = BTreeMap::new();
        for (outcome, count) in counts {
            if count < 0 {
                return Err(ValidationError::NegativeCount { outcome, count });
            }
            *merged.entry(outcome).or_default() += BigUint::from(count as u64);
        }
        Self::from_weights(merged)
    }

    /// Builds a distribution from arbitrary-precision counts.
    pub(crate) fn from_weights(counts: BTreeMap<Outcome, BigUint>) -> Result<Self, ValidationError> {
        let counts: BTreeMap<Outcome, BigUint> =
            counts.into_iter().filter(|(_, c)| !c.is_zero()).collect();
        let total: BigUint = counts.values().sum();
        if total.is_zero() {
            return Err(ValidationError::ZeroTotal);
        }
        Ok(Self {
            counts,
            total,
            truncation: Vec::new(),
            tagged: None,
        })
    }

    /// Builds a distribution whose counts were already checked to be non-empty.
    fn from_nonempty(counts: BTreeMap<Outcome, BigUint>, total: BigUint) -> Self {
        Self {
            counts,
            total,
            truncation: Vec::new(),
            tagged: None,
        }
    }

    /// A distribution that always produces `value`.
    pub fn constant(value: Outcome) -> Self {
        let mut counts = BTreeMap::new();
        counts.insert(value, BigUint::from(1u32));
        Self::from_nonempty(counts, BigUint::from(1u32))
    }

    /// A fair die over `1..=sides`.
    ///
    /// # Errors
    /// Returns `ZeroSidedDie` when `sides` is zero.
    pub fn uniform(sides: u32) -> Result<Self, ValidationError> {
        if sides == 0 {
            return Err(ValidationError::ZeroSidedDie);
        }
        let counts = (1..=i64::from(sides))
            .map(|face| (face, BigUint::from(1u32)))
            .collect();
        Ok(Self::from_nonempty(counts, BigUint::from(sides)))
    }

    // === Transforms ===

    /// Returns the distribution of `f(outcome)`, summing collisions.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(Outcome) -> Outcome,
    {
        if let Some(joint) = &self.tagged {
            let mut mapped: BTreeMap<TaggedOutcome, BigUint> = BTreeMap::new();
            for (key, count) in joint {
                *mapped
                    .entry(TaggedOutcome::new(f(key.value), key.tags.clone()))
                    .or_default() += count;
            }
            return Self::from_tagged(mapped, self.total.clone(), self.truncation.clone());
        }
        let mut counts: BTreeMap<Outcome, BigUint> = BTreeMap::new();
        for (&outcome, count) in &self.counts {
            *counts.entry(f(outcome)).or_default() += count;
        }
        Self {
            counts,
            total: self.total.clone(),
            truncation: self.truncation.clone(),
            tagged: None,
        }
    }

    /// Fallible variant of [`map`](Self::map) for checked arithmetic.
    pub fn try_map<F>(&self, f: F) -> Result<Self, DomainError>
    where
        F: Fn(Outcome) -> Result<Outcome, DomainError>,
    {
        if self.tagged.is_some() {
            return self.try_map_tagged(|key| Ok(TaggedOutcome::new(f(key.value)?, key.tags.clone())));
        }
        let mut counts: BTreeMap<Outcome, BigUint> = BTreeMap::new();
        for (&outcome, count) in &self.counts {
            *counts.entry(f(outcome)?).or_default() += count;
        }
        Ok(Self {
            counts,
            total: self.total.clone(),
            truncation: self.truncation.clone(),
            tagged: None,
        })
    }

    /// Rewrites every (value, tags) pair, summing collisions.
    pub fn try_map_tagged<F>(&self, f: F) -> Result<Self, DomainError>
    where
        F: Fn(&TaggedOutcome) -> Result<TaggedOutcome, DomainError>,
    {
        let mut joint: BTreeMap<TaggedOutcome, BigUint> = BTreeMap::new();
        for (key, count) in self.joint_counts().iter() {
            *joint.entry(f(key)?).or_default() += count;
        }
        Ok(Self::from_tagged(joint, self.total.clone(), self.truncation.clone()))
    }

    /// Returns the distribution of `combine(a, b)` for independent `a` from
    /// this distribution and `b` from `other`. Tags of both sides are added.
    pub fn convolve_with<F>(&self, other: &OutcomeDistribution, combine: F) -> Self
    where
        F: Fn(Outcome, Outcome) -> Outcome,
    {
        if self.is_tagged() || other.is_tagged() {
            return match self.convolve_joint::<_, Infallible>(other, |a, b| Ok(combine(a, b))) {
                Ok(dist) => dist,
                Err(never) => match never {},
            };
        }
        let mut counts: BTreeMap<Outcome, BigUint> = BTreeMap::new();
        for (&a, count_a) in &self.counts {
            for (&b, count_b) in &other.counts {
                *counts.entry(combine(a, b)).or_default() += count_a * count_b;
            }
        }
        Self {
            counts,
            total: &self.total * &other.total,
            truncation: merge_warnings(&self.truncation, &other.truncation),
            tagged: None,
        }
    }

    /// Fallible variant of [`convolve_with`](Self::convolve_with).
    pub fn try_convolve_with<F>(
        &self,
        other: &OutcomeDistribution,
        combine: F,
    ) -> Result<Self, DomainError>
    where
        F: Fn(Outcome, Outcome) -> Result<Outcome, DomainError>,
    {
        if self.is_tagged() || other.is_tagged() {
            return self.convolve_joint(other, combine);
        }
        let mut counts: BTreeMap<Outcome, BigUint> = BTreeMap::new();
        for (&a, count_a) in &self.counts {
            for (&b, count_b) in &other.counts {
                *counts.entry(combine(a, b)?).or_default() += count_a * count_b;
            }
        }
        Ok(Self {
            counts,
            total: &self.total * &other.total,
            truncation: merge_warnings(&self.truncation, &other.truncation),
            tagged: None,
        })
    }

    fn convolve_joint<F, E>(&self, other: &OutcomeDistribution, combine: F) -> Result<Self, E>
    where
        F: Fn(Outcome, Outcome) -> Result<Outcome, E>,
    {
        let (left, right) = (self.joint_counts(), other.joint_counts());
        let mut joint: BTreeMap<TaggedOutcome, BigUint> = BTreeMap::new();
        for (a, count_a) in left.iter() {
            for (b, count_b) in right.iter() {
                let key = TaggedOutcome::new(combine(a.value, b.value)?, a.tags.merged(&b.tags));
                *joint.entry(key).or_default() += count_a * count_b;
            }
        }
        Ok(Self::from_tagged(
            joint,
            &self.total * &other.total,
            merge_warnings(&self.truncation, &other.truncation),
        ))
    }

    /// Returns a copy carrying an additional truncation warning.
    pub fn with_truncation(mut self, warning: TruncationWarning) -> Self {
        if !self.truncation.contains(&warning) {
            self.truncation.push(warning);
        }
        self
    }

    /// Returns a copy carrying every warning from `other` as well.
    pub(crate) fn inheriting_warnings(mut self, other: &OutcomeDistribution) -> Self {
        self.truncation = merge_warnings(&self.truncation, &other.truncation);
        self
    }

    // === Statistics ===

    /// Exact mean.
    pub fn expected_value(&self) -> BigRational {
        let numerator: BigInt = self
            .counts
            .iter()
            .map(|(&outcome, count)| BigInt::from(outcome) * BigInt::from(count.clone()))
            .sum();
        BigRational::new(numerator, BigInt::from(self.total.clone()))
    }

    /// Exact variance, `E[X^2] - E[X]^2`.
    pub fn variance(&self) -> BigRational {
        let second: BigInt = self
            .counts
            .iter()
            .map(|(&outcome, count)| {
                let value = BigInt::from(outcome);
                &value * &value * BigInt::from(count.clone())
            })
            .sum();
        let second_moment = BigRational::new(second, BigInt::from(self.total.clone()));
        let mean = self.expected_value();
        second_moment - &mean * &mean
    }

    /// Standard deviation as f64, for reporting.
    pub fn standard_deviation(&self) -> f64 {
        self.variance().to_f64().unwrap_or(f64::NAN).sqrt()
    }

    /// Probability that the outcome is at most `threshold`.
    pub fn cumulative_at(&self, threshold: Outcome) -> Probability {
        let mass: BigUint = self.counts.range(..=threshold).map(|(_, c)| c).sum();
        Probability::from_counts(&mass, &self.total)
    }

    /// Probability that the outcome is at least `threshold`.
    pub fn at_least(&self, threshold: Outcome) -> Probability {
        let mass: BigUint = self.counts.range(threshold..).map(|(_, c)| c).sum();
        Probability::from_counts(&mass, &self.total)
    }

    /// Probability of exactly `outcome`.
    pub fn probability_of(&self, outcome: Outcome) -> Probability {
        match self.counts.get(&outcome) {
            Some(count) => Probability::from_counts(count, &self.total),
            None => Probability::zero(),
        }
    }

    /// Probability that `predicate` holds for the outcome.
    pub fn probability_where<P>(&self, predicate: P) -> Probability
    where
        P: Fn(Outcome) -> bool,
    {
        Probability::from_counts(&self.count_where(predicate), &self.total)
    }

    /// Probability that `predicate` holds for the value and its tags.
    pub fn probability_where_tagged<P>(&self, predicate: P) -> Probability
    where
        P: Fn(Outcome, &TagSet) -> bool,
    {
        let mass: BigUint = self
            .joint_counts()
            .iter()
            .filter(|(key, _)| predicate(key.value, &key.tags))
            .map(|(_, c)| c)
            .sum();
        Probability::from_counts(&mass, &self.total)
    }

    /// Probability that the outcome carries `tag` at least once.
    pub fn tag_probability(&self, tag: &str) -> Probability {
        self.probability_where_tagged(|_, tags| tags.contains(tag))
    }

    /// Sum of all probabilities. Always exactly one.
    pub fn total_probability(&self) -> Probability {
        let mass: BigUint = self.counts.values().sum();
        Probability::from_counts(&mass, &self.total)
    }

    /// Smallest possible outcome.
    pub fn min_outcome(&self) -> Outcome {
        self.counts.keys().next().copied().unwrap_or_default()
    }

    /// Largest possible outcome.
    pub fn max_outcome(&self) -> Outcome {
        self.counts.keys().next_back().copied().unwrap_or_default()
    }

    /// Most likely outcome; the smallest one wins a tie.
    pub fn mode(&self) -> Outcome {
        let mut best: Option<(Outcome, &BigUint)> = None;
        for (&outcome, count) in &self.counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((outcome, count)),
            }
        }
        best.map(|(outcome, _)| outcome).unwrap_or_default()
    }

    /// Returns true if only one outcome is possible.
    pub fn is_deterministic(&self) -> bool {
        self.counts.len() == 1
    }

    // === Accessors ===

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Number of distinct (value, tags) pairs; equals [`len`](Self::len) for
    /// untagged distributions.
    pub fn support_size(&self) -> usize {
        self.tagged.as_ref().map_or(self.counts.len(), BTreeMap::len)
    }

    /// Returns true if any outcome carries a tag.
    pub fn is_tagged(&self) -> bool {
        self.tagged.is_some()
    }

    /// Always false; a distribution has at least one outcome.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Possible outcomes in ascending order.
    pub fn outcomes(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.counts.keys().copied()
    }

    /// (outcome, probability) pairs in ascending outcome order.
    pub fn iter(&self) -> impl Iterator<Item = (Outcome, Probability)> + '_ {
        self.counts
            .iter()
            .map(move |(&outcome, count)| (outcome, Probability::from_counts(count, &self.total)))
    }

    /// (outcome, probability) pairs in ascending outcome order.
    pub fn pairs(&self) -> Vec<(Outcome, Probability)> {
        self.iter().collect()
    }

    /// ((value, tags), probability) pairs in ascending order.
    pub fn tagged_pairs(&self) -> Vec<(TaggedOutcome, Probability)> {
        self.joint_counts()
            .iter()
            .map(|(key, count)| (key.clone(), Probability::from_counts(count, &self.total)))
            .collect()
    }

    /// Number of elementary outcomes producing `outcome`.
    pub fn count_of(&self, outcome: Outcome) -> BigUint {
        self.counts.get(&outcome).cloned().unwrap_or_default()
    }

    /// Number of elementary outcomes considered.
    pub fn total_count(&self) -> &BigUint {
        &self.total
    }

    /// Truncation notices inherited from bounded operators.
    pub fn truncation_warnings(&self) -> &[TruncationWarning] {
        &self.truncation
    }

    /// Returns true if any bounded operator truncated this distribution.
    pub fn is_truncated(&self) -> bool {
        !self.truncation.is_empty()
    }

    /// Ordered view for charts and reports.
    pub fn view(&self) -> DistributionView {
        let mut running = BigUint::zero();
        let outcomes = self
            .counts
            .iter()
            .map(|(&outcome, count)| {
                running += count;
                OutcomeProbability {
                    outcome,
                    probability: Probability::from_counts(count, &self.total),
                    cumulative: Probability::from_counts(&running, &self.total),
                }
            })
            .collect();
        let tagged = self
            .tagged
            .iter()
            .flatten()
            .map(|(key, count)| TaggedProbability {
                outcome: key.value,
                tags: key.tags.clone(),
                probability: Probability::from_counts(count, &self.total),
            })
            .collect();
        DistributionView {
            outcomes,
            tagged,
            expected_value: self.expected_value().to_f64().unwrap_or(f64::NAN),
            standard_deviation: self.standard_deviation(),
            truncation: self.truncation.clone(),
        }
    }

    pub(crate) fn raw_counts(&self) -> &BTreeMap<Outcome, BigUint> {
        &self.counts
    }

    pub(crate) fn count_where<P>(&self, predicate: P) -> BigUint
    where
        P: Fn(Outcome) -> bool,
    {
        self.counts
            .iter()
            .filter(|(&outcome, _)| predicate(outcome))
            .map(|(_, c)| c)
            .sum()
    }

    /// Joint (value, tags) counts; an untagged distribution lists every
    /// value with an empty tag set.
    pub(crate) fn joint_counts(&self) -> Cow<'_, BTreeMap<TaggedOutcome, BigUint>> {
        match &self.tagged {
            Some(joint) => Cow::Borrowed(joint),
            None => Cow::Owned(
                self.counts
                    .iter()
                    .map(|(&outcome, count)| (TaggedOutcome::plain(outcome), count.clone()))
                    .collect(),
            ),
        }
    }

    pub(crate) fn from_parts(
        counts: BTreeMap<Outcome, BigUint>,
        total: BigUint,
        truncation: Vec<TruncationWarning>,
    ) -> Self {
        let counts = counts.into_iter().filter(|(_, c)| !c.is_zero()).collect();
        Self {
            counts,
            total,
            truncation,
            tagged: None,
        }
    }

    /// Builds from joint counts, keeping the joint table only when some
    /// outcome is tagged.
    pub(crate) fn from_tagged(
        joint: BTreeMap<TaggedOutcome, BigUint>,
        total: BigUint,
        truncation: Vec<TruncationWarning>,
    ) -> Self {
        let joint: BTreeMap<TaggedOutcome, BigUint> =
            joint.into_iter().filter(|(_, c)| !c.is_zero()).collect();
        let mut counts: BTreeMap<Outcome, BigUint> = BTreeMap::new();
        for (key, count) in &joint {
            *counts.entry(key.value).or_default() += count;
        }
        let tagged = joint
            .keys()
            .any(|key| !key.tags.is_empty())
            .then_some(joint);
        Self {
            counts,
            total,
            truncation,
            tagged,
        }
    }
}

impl PartialEq for OutcomeDistribution {
    /// Distributions are equal when every (value, tags) pair has the same
    /// probability and they carry the same truncation notices; totals may
    /// differ.
    fn eq(&self, other: &Self) -> bool {
        if self.truncation != other.truncation {
            return false;
        }
        match (&self.tagged, &other.tagged) {
            (None, None) => scaled_eq(&self.counts, &self.total, &other.counts, &other.total),
            (Some(left), Some(right)) => scaled_eq(left, &self.total, right, &other.total),
            _ => false,
        }
    }
}

impl Eq for OutcomeDistribution {}

fn scaled_eq<K: Eq>(
    left: &BTreeMap<K, BigUint>,
    left_total: &BigUint,
    right: &BTreeMap<K, BigUint>,
    right_total: &BigUint,
) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right.iter())
            .all(|((a, count_a), (b, count_b))| {
                a == b && count_a * right_total == count_b * left_total
            })
}

fn merge_warnings(
    left: &[TruncationWarning],
    right: &[TruncationWarning],
) -> Vec<TruncationWarning> {
    let mut merged = left.to_vec();
    for warning in right {
        if !merged.contains(warning) {
            merged.push(warning.clone());
        }
    }
    merged
}
