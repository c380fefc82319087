//! Results produced by the interaction analyzer.

use num_rational::BigRational;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::distribution::{DistributionView, OutcomeDistribution};
use crate::domain::expression::ComparisonOperator;
use crate::domain::foundation::{Probability, TruncationWarning};

use super::TiePolicy;

/// Distribution of a comparison's truth value over {1, 0}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub operator: ComparisonOperator,
    /// Mass of outcome 1 (the comparison holds) and 0 (it does not).
    pub distribution: OutcomeDistribution,
}

impl ComparisonResult {
    /// Probability that the comparison holds.
    pub fn success_probability(&self) -> Probability {
        self.distribution.probability_of(1)
    }

    /// Probability that the comparison fails.
    pub fn failure_probability(&self) -> Probability {
        self.distribution.probability_of(0)
    }
}

/// Resolution of an opposed roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpposedOutcome {
    FirstWins,
    SecondWins,
    Tie,
}

/// Probabilities of each opposed-roll resolution under a tie policy.
///
/// `tie` is zero unless the policy is [`TiePolicy::KeepTie`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpposedDistribution {
    pub policy: TiePolicy,
    pub first_wins: Probability,
    pub second_wins: Probability,
    pub tie: Probability,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub truncation: Vec<TruncationWarning>,
}

impl OpposedDistribution {
    /// Probability of one resolution.
    pub fn probability(&self, outcome: OpposedOutcome) -> &Probability {
        match outcome {
            OpposedOutcome::FirstWins => &self.first_wins,
            OpposedOutcome::SecondWins => &self.second_wins,
            OpposedOutcome::Tie => &self.tie,
        }
    }

    /// (resolution, probability) pairs with non-zero mass.
    pub fn outcomes(&self) -> Vec<(OpposedOutcome, Probability)> {
        [
            OpposedOutcome::FirstWins,
            OpposedOutcome::SecondWins,
            OpposedOutcome::Tie,
        ]
        .into_iter()
        .map(|outcome| (outcome, self.probability(outcome).clone()))
        .filter(|(_, probability)| !probability.is_zero())
        .collect()
    }
}

/// Full analysis of A versus B.
///
/// Win, loss, and tie are the raw probabilities that `a > b`, `a < b`, and
/// `a == b`; the tie policy only shapes [`opposed`](Self::opposed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionResult {
    pub win_probability: Probability,
    pub loss_probability: Probability,
    pub tie_probability: Probability,
    pub expected_margin: BigRational,
    pub variance_of_margin: BigRational,
    /// Distribution of `a - b`.
    pub margin: OutcomeDistribution,
    pub opposed: OpposedDistribution,
}

impl InteractionResult {
    /// Named scalar summaries for reports.
    pub fn summary(&self) -> InteractionSummary {
        InteractionSummary {
            win_probability: self.win_probability.clone(),
            loss_probability: self.loss_probability.clone(),
            tie_probability: self.tie_probability.clone(),
            expected_margin: self.expected_margin.to_f64().unwrap_or(f64::NAN),
            variance_of_margin: self.variance_of_margin.to_f64().unwrap_or(f64::NAN),
            opposed: self.opposed.clone(),
            margin: self.margin.view(),
        }
    }

    /// Returns true if any input was truncated by a bounded operator.
    pub fn is_truncated(&self) -> bool {
        self.margin.is_truncated()
    }
}

/// Serializable report of an [`InteractionResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionSummary {
    pub win_probability: Probability,
    pub loss_probability: Probability,
    pub tie_probability: Probability,
    pub expected_margin: f64,
    pub variance_of_margin: f64,
    pub opposed: OpposedDistribution,
    pub margin: DistributionView,
}
