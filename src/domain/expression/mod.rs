//! Expression Module - dice expression trees.
//!
//! # Components
//!
//! - `Expr` - Closed set of operator nodes (dice, arithmetic, selection,
//!   bounded reroll/explode, transforms, comparisons)
//! - `Predicate` - Outcome tests used by reroll, explode, and conditional rules
//! - `Transform` - Outcome rewrites applied by `Expr::Map` and tag rules
//! - `TagCondition` - Tests over outcome tags, e.g. "carries crit"
//! - `BinaryOp` / `ComparisonOperator` - Combinators carried as data
//!
//! Trees carry no evaluation state and may be shared read-only across threads.

mod builder;
mod node;
mod operator;
mod predicate;
mod tag_condition;
mod transform;

pub use node::{Expr, Face};
pub use operator::{BinaryOp, ComparisonOperator, Rounding};
pub use predicate::Predicate;
pub use tag_condition::TagCondition;
pub use transform::Transform;
