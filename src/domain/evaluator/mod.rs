//! Evaluator - turns expression trees into exact distributions.
//!
//! Evaluation runs in three steps:
//! 1. Structural validation of the whole tree (fails fast, no partial work)
//! 2. Bottom-up reduction with a per-call memo keyed by node structure
//! 3. Resource checks on every intermediate result
//!
//! Selection over identical dice walks faces in preference order; reroll and
//! explode are exact up to their bound and attach a truncation warning.

mod bounded;
#[allow(clippy::module_inception)]
mod evaluator;
mod limits;
mod memo;
mod selection;
mod validation;

pub use evaluator::{EvaluationStats, Evaluator};
pub use limits::EvaluationLimits;
