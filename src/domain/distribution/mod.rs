//! Distribution Module - exact outcome distributions.
//!
//! The common currency of the engine: the evaluator produces distributions,
//! the analyzer consumes them, and charts read their ordered views. Every
//! transform returns a new value; nothing is mutated in place.

mod builder;
mod outcome_distribution;
mod tags;
mod view;

pub use builder::DistributionBuilder;
pub use outcome_distribution::{Outcome, OutcomeDistribution};
pub use tags::{TagSet, TaggedOutcome};
pub use view::{DistributionView, OutcomeProbability, TaggedProbability};
