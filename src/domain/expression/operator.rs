//! Binary combinators and comparison operators over outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::distribution::Outcome;
use crate::domain::foundation::{DomainError, ValidationError};

/// Rounding rule for integer division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Round half to even.
    Nearest,
    Floor,
    Ceiling,
}

/// Arithmetic or selection rule folding two outcomes into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    /// Division rounded half to even.
    Divide,
    /// Division rounded toward negative infinity.
    FloorDivide,
    /// Remainder with the sign of the divisor.
    Modulo,
    Power,
    Max,
    Min,
}

impl BinaryOp {
    /// Applies the combinator with checked arithmetic.
    pub fn apply(&self, a: Outcome, b: Outcome) -> Result<Outcome, DomainError> {
        match self {
            BinaryOp::Add => a.checked_add(b).ok_or_else(|| DomainError::overflow("addition")),
            BinaryOp::Subtract => a
                .checked_sub(b)
                .ok_or_else(|| DomainError::overflow("subtraction")),
            BinaryOp::Multiply => a
                .checked_mul(b)
                .ok_or_else(|| DomainError::overflow("multiplication")),
            BinaryOp::Divide => divide(a, b, Rounding::Nearest),
            BinaryOp::FloorDivide => divide(a, b, Rounding::Floor),
            BinaryOp::Modulo => modulo(a, b),
            BinaryOp::Power => power(a, b),
            BinaryOp::Max => Ok(a.max(b)),
            BinaryOp::Min => Ok(a.min(b)),
        }
    }

    /// Returns true if a zero right-hand operand is undefined.
    pub fn rejects_zero_divisor(&self) -> bool {
        matches!(
            self,
            BinaryOp::Divide | BinaryOp::FloorDivide | BinaryOp::Modulo
        )
    }

    /// Returns true if a negative right-hand operand is undefined.
    pub fn rejects_negative_exponent(&self) -> bool {
        matches!(self, BinaryOp::Power)
    }

    /// Returns the operator symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::FloorDivide => "//",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "**",
            BinaryOp::Max => "max",
            BinaryOp::Min => "min",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Relation tested between two outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Less,
    LessOrEqual,
    Equal,
    NotEqual,
    GreaterOrEqual,
    Greater,
}

impl ComparisonOperator {
    /// Returns true if `a <op> b` holds.
    pub fn holds(&self, a: Outcome, b: Outcome) -> bool {
        match self {
            ComparisonOperator::Less => a < b,
            ComparisonOperator::LessOrEqual => a <= b,
            ComparisonOperator::Equal => a == b,
            ComparisonOperator::NotEqual => a != b,
            ComparisonOperator::GreaterOrEqual => a >= b,
            ComparisonOperator::Greater => a > b,
        }
    }

    /// Returns the operator symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::Greater => ">",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Integer division with an explicit rounding rule.
pub(crate) fn divide(a: Outcome, b: Outcome, rounding: Rounding) -> Result<Outcome, DomainError> {
    if b == 0 {
        return Err(ValidationError::division_by_zero("division").into());
    }
    // i128 keeps the sign flip of i64::MIN exact.
    let (mut n, mut d) = (i128::from(a), i128::from(b));
    if d < 0 {
        n = -n;
        d = -d;
    }
    let floor = n.div_euclid(d);
    let rem = n.rem_euclid(d);
    let quotient = match rounding {
        Rounding::Floor => floor,
        Rounding::Ceiling => {
            if rem == 0 {
                floor
            } else {
                floor + 1
            }
        }
        Rounding::Nearest => match (2 * rem).cmp(&d) {
            std::cmp::Ordering::Less => floor,
            std::cmp::Ordering::Greater => floor + 1,
            std::cmp::Ordering::Equal => floor + (floor & 1),
        },
    };
    Outcome::try_from(quotient).map_err(|_| DomainError::overflow("division"))
}

/// Remainder taking the sign of the divisor.
pub(crate) fn modulo(a: Outcome, b: Outcome) -> Result<Outcome, DomainError> {
    if b == 0 {
        return Err(ValidationError::division_by_zero("modulo").into());
    }
    let rem = i128::from(a).rem_euclid(i128::from(b).abs());
    let signed = if b < 0 && rem != 0 { rem + i128::from(b) } else { rem };
    Outcome::try_from(signed).map_err(|_| DomainError::overflow("modulo"))
}

fn power(base: Outcome, exponent: Outcome) -> Result<Outcome, DomainError> {
    if exponent < 0 {
        return Err(ValidationError::NegativeExponent { exponent }.into());
    }
    let exponent = u32::try_from(exponent).map_err(|_| DomainError::overflow("power"))?;
    base.checked_pow(exponent)
        .ok_or_else(|| DomainError::overflow("power"))
}
