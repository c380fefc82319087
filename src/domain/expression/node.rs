//! Expression Node - the closed set of dice operators.

use serde::{Deserialize, Serialize};

use crate::domain::distribution::Outcome;

use super::{BinaryOp, ComparisonOperator, Predicate, TagCondition, Transform};

/// One face of a weighted die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Face {
    pub value: Outcome,
    pub weight: u64,
}

impl Face {
    /// Creates a face with the given relative weight.
    pub fn new(value: Outcome, weight: u64) -> Self {
        Self { value, weight }
    }
}

/// A node in a dice expression tree.
///
/// Trees are immutable once built and own their children, so they are
/// acyclic by construction. Equality and hashing are structural: two
/// separately built `3d6` subtrees are the same key for memoization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    Constant {
        value: Outcome,
    },
    UniformDie {
        sides: u32,
    },
    Die {
        faces: Vec<Face>,
    },
    Sum {
        children: Vec<Expr>,
    },
    /// Left fold of the children under `combinator`.
    Product {
        children: Vec<Expr>,
        combinator: BinaryOp,
    },
    SelectHighest {
        keep: usize,
        pool: Vec<Expr>,
    },
    SelectLowest {
        keep: usize,
        pool: Vec<Expr>,
    },
    /// Rerolled at most `max_attempts` times while the predicate holds.
    Reroll {
        child: Box<Expr>,
        predicate: Predicate,
        max_attempts: u32,
    },
    /// Rolled again and added at most `max_depth` times while the predicate holds.
    Explode {
        child: Box<Expr>,
        predicate: Predicate,
        max_depth: u32,
    },
    Map {
        child: Box<Expr>,
        transform: Transform,
    },
    /// 1 when `left <operator> right` holds, otherwise 0.
    Compare {
        left: Box<Expr>,
        right: Box<Expr>,
        operator: ComparisonOperator,
    },
    /// Adds `tag` to every outcome matching the predicate.
    Tag {
        child: Box<Expr>,
        tag: String,
        predicate: Predicate,
    },
    /// Rewrites the value of outcomes whose tags satisfy `condition`.
    TagRule {
        child: Box<Expr>,
        condition: TagCondition,
        transform: Transform,
    },
    /// Drops the listed tags; an empty list drops them all.
    RemoveTags {
        child: Box<Expr>,
        #[serde(default)]
        tags: Vec<String>,
    },
}

impl Expr {
    /// Returns the operator name used in errors and logs.
    pub fn operator_name(&self) -> &'static str {
        match self {
            Expr::Constant { .. } => "constant",
            Expr::UniformDie { .. } => "uniform_die",
            Expr::Die { .. } => "die",
            Expr::Sum { .. } => "sum",
            Expr::Product { .. } => "product",
            Expr::SelectHighest { .. } => "select_highest",
            Expr::SelectLowest { .. } => "select_lowest",
            Expr::Reroll { .. } => "reroll",
            Expr::Explode { .. } => "explode",
            Expr::Map { .. } => "map",
            Expr::Compare { .. } => "compare",
            Expr::Tag { .. } => "tag",
            Expr::TagRule { .. } => "tag_rule",
            Expr::RemoveTags { .. } => "remove_tags",
        }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Constant { .. } | Expr::UniformDie { .. } | Expr::Die { .. } => Vec::new(),
            Expr::Sum { children } | Expr::Product { children, .. } => children.iter().collect(),
            Expr::SelectHighest { pool, .. } | Expr::SelectLowest { pool, .. } => {
                pool.iter().collect()
            }
            Expr::Reroll { child, .. }
            | Expr::Explode { child, .. }
            | Expr::Map { child, .. }
            | Expr::Tag { child, .. }
            | Expr::TagRule { child, .. }
            | Expr::RemoveTags { child, .. } => vec![child.as_ref()],
            Expr::Compare { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Returns true for leaves that need no children.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Expr::Constant { .. } | Expr::UniformDie { .. } | Expr::Die { .. }
        )
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expr::node_count)
            .sum::<usize>()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expr::depth)
            .max()
            .unwrap_or(0)
    }
}
