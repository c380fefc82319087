//! Builder for hand-assembled distributions (custom dice tables, test data).

use num_bigint::BigUint;
use std::collections::BTreeMap;

use crate::domain::foundation::{TruncationWarning, ValidationError};

use super::{Outcome, OutcomeDistribution};

/// Builder for constructing OutcomeDistribution instances.
#[derive(Debug, Default)]
pub struct DistributionBuilder {
    counts: BTreeMap<Outcome, BigUint>,
    truncation: Vec<TruncationWarning>,
}

impl DistributionBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` elementary outcomes producing `outcome`.
    pub fn count(mut self, outcome: Outcome, count: u64) -> Self {
        *self.counts.entry(outcome).or_default() += BigUint::from(count);
        self
    }

    /// Adds one elementary outcome for each listed value.
    pub fn faces(mut self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        for outcome in outcomes {
            *self.counts.entry(outcome).or_default() += BigUint::from(1u32);
        }
        self
    }

    /// Attaches a truncation notice to the built distribution.
    pub fn truncation(mut self, warning: TruncationWarning) -> Self {
        self.truncation.push(warning);
        self
    }

    /// Builds the distribution.
    ///
    /// # Errors
    /// Returns `ZeroTotal` if no outcome received a positive count.
    pub fn build(self) -> Result<OutcomeDistribution, ValidationError> {
        let dist = OutcomeDistribution::from_weights(self.counts)?;
        Ok(self
            .truncation
            .into_iter()
            .fold(dist, |dist, warning| dist.with_truncation(warning)))
    }
}
