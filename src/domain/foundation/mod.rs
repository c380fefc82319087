//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, metadata, and error types that form the
//! vocabulary shared by distributions, expressions, and analysis.

mod errors;
mod probability;
mod truncation;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use probability::Probability;
pub use truncation::{BoundedOperator, TruncationWarning};
