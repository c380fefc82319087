//! Truncation metadata attached to distributions built from bounded operators.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Probability;

/// The bounded operator that stopped short of its unbounded behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundedOperator {
    Reroll,
    Explode,
}

impl BoundedOperator {
    /// Returns the display label for this operator.
    pub fn label(&self) -> &'static str {
        match self {
            BoundedOperator::Reroll => "reroll",
            BoundedOperator::Explode => "explode",
        }
    }
}

/// Non-fatal notice that a bounded operator cut off an infinite process.
///
/// `residual` is the exact probability mass of the chains that would have
/// continued past `bound`. It stays attached to the deepest computed outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TruncationWarning {
    pub operator: BoundedOperator,
    pub bound: u32,
    pub residual: Probability,
}

impl TruncationWarning {
    /// Creates a new truncation warning.
    pub fn new(operator: BoundedOperator, bound: u32, residual: Probability) -> Self {
        Self {
            operator,
            bound,
            residual,
        }
    }
}

impl fmt::Display for TruncationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} truncated after {} rounds with residual mass {}",
            self.operator.label(),
            self.bound,
            self.residual
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_operator_and_residual() {
        let warning =
            TruncationWarning::new(BoundedOperator::Explode, 2, Probability::ratio(1, 216));
        assert_eq!(
            warning.to_string(),
            "explode truncated after 2 rounds with residual mass 1/216"
        );
    }

    #[test]
    fn serializes_operator_in_snake_case() {
        let warning = TruncationWarning::new(BoundedOperator::Reroll, 1, Probability::ratio(1, 4));
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"reroll\""));
        assert!(json.contains("\"1/4\""));
    }
}
