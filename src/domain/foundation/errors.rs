//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Structural faults found while validating expressions or distribution data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Die must have at least one side")]
    ZeroSidedDie,

    #[error("Weighted die must list at least one face")]
    EmptyFaces,

    #[error("Weighted die has a total face weight of zero")]
    ZeroWeightDie,

    #[error("Operator '{operator}' requires at least one operand")]
    EmptyOperands { operator: &'static str },

    #[error("Cannot keep {keep} of {pool} dice")]
    SelectionExceedsPool { keep: usize, pool: usize },

    #[error("Selection must keep at least one die")]
    EmptySelection,

    #[error("Bound '{field}' is {actual}, above the configured ceiling of {max}")]
    BoundTooLarge {
        field: &'static str,
        max: u32,
        actual: u32,
    },

    #[error("Tag names must not be empty ({operator})")]
    EmptyTagName { operator: &'static str },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Clamp range {min}..={max} is empty")]
    EmptyRange { min: i64, max: i64 },

    #[error("Negative exponent {exponent} cannot produce an integer outcome")]
    NegativeExponent { exponent: i64 },

    #[error("Outcome {outcome} has negative count {count}")]
    NegativeCount { outcome: i64, count: i64 },

    #[error("Distribution has a total count of zero")]
    ZeroTotal,

    #[error("Probability {numerator}/{denominator} exceeds one")]
    ProbabilityAboveOne { numerator: u64, denominator: u64 },

    #[error("Cannot {operation} an empty list of distributions")]
    NoDistributions { operation: &'static str },

    #[error("Opposed roll always ties, so a tie reroll never resolves")]
    UnresolvableTie,
}

impl ValidationError {
    /// Creates a division by zero error for the given context.
    pub fn division_by_zero(context: impl Into<String>) -> Self {
        ValidationError::DivisionByZero {
            context: context.into(),
        }
    }

    /// Returns true if this error describes malformed distribution data
    /// rather than a malformed expression.
    pub fn is_distribution_fault(&self) -> bool {
        matches!(
            self,
            ValidationError::NegativeCount { .. }
                | ValidationError::ZeroTotal
                | ValidationError::ProbabilityAboveOne { .. }
                | ValidationError::NoDistributions { .. }
                | ValidationError::UnresolvableTie
        )
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Structural errors
    InvalidExpression,
    InvalidDistribution,

    // Resource errors
    OutcomeLimitExceeded,
    ArithmeticOverflow,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidExpression => "INVALID_EXPRESSION",
            ErrorCode::InvalidDistribution => "INVALID_DISTRIBUTION",
            ErrorCode::OutcomeLimitExceeded => "OUTCOME_LIMIT_EXCEEDED",
            ErrorCode::ArithmeticOverflow => "ARITHMETIC_OVERFLOW",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates an invalid expression error.
    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidExpression, message)
    }

    /// Creates an invalid distribution error.
    pub fn invalid_distribution(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDistribution, message)
    }

    /// Creates an overflow error for the named arithmetic operation.
    pub fn overflow(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        Self::new(
            ErrorCode::ArithmeticOverflow,
            format!("Outcome arithmetic overflowed during {}", operation),
        )
        .with_detail("operation", operation)
    }

    /// Creates an outcome limit error.
    pub fn outcome_limit(limit: usize, actual: usize) -> Self {
        Self::new(
            ErrorCode::OutcomeLimitExceeded,
            format!("{} distinct outcomes exceed the limit of {}", actual, limit),
        )
        .with_detail("limit", limit.to_string())
        .with_detail("actual", actual.to_string())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = if err.is_distribution_fault() {
            ErrorCode::InvalidDistribution
        } else {
            ErrorCode::InvalidExpression
        };
        DomainError::new(code, err.to_string())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
