//! Associative reducers for aggregating independent distributions.

use serde::{Deserialize, Serialize};

use crate::domain::distribution::Outcome;
use crate::domain::expression::BinaryOp;
use crate::domain::foundation::DomainError;

/// Rule folding many independent results into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Sum,
    Max,
    Min,
}

impl Reducer {
    /// The binary combinator this reducer folds with.
    pub fn combinator(&self) -> BinaryOp {
        match self {
            Reducer::Sum => BinaryOp::Add,
            Reducer::Max => BinaryOp::Max,
            Reducer::Min => BinaryOp::Min,
        }
    }

    /// Combines two outcomes with checked arithmetic.
    pub fn apply(&self, a: Outcome, b: Outcome) -> Result<Outcome, DomainError> {
        self.combinator().apply(a, b)
    }
}
