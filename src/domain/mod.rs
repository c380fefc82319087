//! Domain layer containing the dice algebra.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (probability, truncation notices, errors)
//! - `distribution` - Exact outcome distributions and their views
//! - `expression` - The closed set of dice operators and their builders
//! - `evaluator` - Reduction of expression trees to distributions
//! - `analysis` - Comparisons and aggregates of independent distributions

pub mod analysis;
pub mod distribution;
pub mod evaluator;
pub mod expression;
pub mod foundation;
