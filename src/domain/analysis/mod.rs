//! Analysis Module - Pure domain services for comparing dice results.
//!
//! # Components
//!
//! - `InteractionAnalyzer` - comparisons, margins, opposed rolls, aggregates
//! - `InteractionResult` - named scalar summaries plus the full margin
//! - `TiePolicy` - caller-chosen tie rule for opposed rolls
//! - `Reducer` - associative fold rule for aggregates
//!
//! # Design Philosophy
//!
//! All functions are pure (no side effects). They take distributions as
//! input and return computed results; the analyzer only carries the
//! support ceiling it checks margins and aggregates against.

mod interaction_analyzer;
mod interaction_result;
mod reducer;
mod tie_policy;

pub use interaction_analyzer::InteractionAnalyzer;
pub use interaction_result::{
    ComparisonResult, InteractionResult, InteractionSummary, OpposedDistribution, OpposedOutcome,
};
pub use reducer::Reducer;
pub use tie_policy::TiePolicy;
