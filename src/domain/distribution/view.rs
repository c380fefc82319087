//! Ordered, serializable view of a distribution for charts and reports.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Probability, TruncationWarning};

use super::{Outcome, TagSet};

/// One row of a distribution view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbability {
    pub outcome: Outcome,
    pub probability: Probability,
    /// Probability of this outcome or any smaller one.
    pub cumulative: Probability,
}

/// Probability of one (value, tags) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedProbability {
    pub outcome: Outcome,
    pub tags: TagSet,
    pub probability: Probability,
}

/// A finished distribution as (outcome, probability) rows sorted by outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionView {
    pub outcomes: Vec<OutcomeProbability>,
    /// Joint rows, present only when some outcome carries a tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tagged: Vec<TaggedProbability>,
    pub expected_value: f64,
    pub standard_deviation: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub truncation: Vec<TruncationWarning>,
}

impl DistributionView {
    /// Returns the outcomes and probabilities as f64 pairs, for plotting.
    pub fn as_f64_pairs(&self) -> Vec<(Outcome, f64)> {
        self.outcomes
            .iter()
            .map(|row| (row.outcome, row.probability.to_f64()))
            .collect()
    }
}
