//! Outcome predicates used by reroll, explode, and conditional transforms.

use serde::{Deserialize, Serialize};

use crate::domain::distribution::{Outcome, OutcomeDistribution};

/// A test applied to a single outcome.
///
/// `Maximum` and `Minimum` are relative: they match the largest or smallest
/// outcome of the distribution the predicate is applied against, which makes
/// "explode on the highest face" independent of the die size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    Equals { value: Outcome },
    OneOf { values: Vec<Outcome> },
    AtLeast { value: Outcome },
    AtMost { value: Outcome },
    Between { min: Outcome, max: Outcome },
    Maximum,
    Minimum,
    /// Matches every outcome.
    Always,
    Not { inner: Box<Predicate> },
}

impl Predicate {
    /// Matches exactly `value`.
    pub fn equals(value: Outcome) -> Self {
        Predicate::Equals { value }
    }

    /// Matches any of `values`.
    pub fn one_of(values: impl IntoIterator<Item = Outcome>) -> Self {
        Predicate::OneOf {
            values: values.into_iter().collect(),
        }
    }

    /// Matches outcomes `>= value`.
    pub fn at_least(value: Outcome) -> Self {
        Predicate::AtLeast { value }
    }

    /// Matches outcomes `<= value`.
    pub fn at_most(value: Outcome) -> Self {
        Predicate::AtMost { value }
    }

    /// Matches outcomes in `min..=max`.
    pub fn between(min: Outcome, max: Outcome) -> Self {
        Predicate::Between { min, max }
    }

    /// Inverts this predicate.
    pub fn negate(self) -> Self {
        Predicate::Not {
            inner: Box::new(self),
        }
    }

    /// Tests `outcome`, resolving relative predicates against `context`.
    pub fn matches(&self, outcome: Outcome, context: &OutcomeDistribution) -> bool {
        match self {
            Predicate::Equals { value } => outcome == *value,
            Predicate::OneOf { values } => values.contains(&outcome),
            Predicate::AtLeast { value } => outcome >= *value,
            Predicate::AtMost { value } => outcome <= *value,
            Predicate::Between { min, max } => (*min..=*max).contains(&outcome),
            Predicate::Maximum => outcome == context.max_outcome(),
            Predicate::Minimum => outcome == context.min_outcome(),
            Predicate::Always => true,
            Predicate::Not { inner } => !inner.matches(outcome, context),
        }
    }
}
