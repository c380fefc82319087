//! Eager structural validation, run once before any distribution is built.

use crate::domain::expression::{BinaryOp, Expr};
use crate::domain::foundation::ValidationError;

use super::EvaluationLimits;

/// Walks the whole tree and rejects the first structural fault found.
///
/// # Errors
/// - `ZeroSidedDie` for `UniformDie { sides: 0 }`
/// - `EmptyFaces` / `ZeroWeightDie` for weighted dice with no usable face
/// - `EmptyOperands` for sums, products, or selections without children
/// - `EmptySelection` / `SelectionExceedsPool` for bad `keep` values
/// - `BoundTooLarge` when a reroll or explode bound exceeds the ceiling
/// - `DivisionByZero` / `NegativeExponent` for constant right-hand operands
///   and transform parameters that are undefined for every input
/// - `EmptyTagName` for a tag node or condition naming the empty tag
pub(crate) fn validate_tree(expr: &Expr, limits: &EvaluationLimits) -> Result<(), ValidationError> {
    validate_node(expr, limits)?;
    expr.children()
        .into_iter()
        .try_for_each(|child| validate_tree(child, limits))
}

fn validate_node(expr: &Expr, limits: &EvaluationLimits) -> Result<(), ValidationError> {
    match expr {
        Expr::Constant { .. } => Ok(()),
        Expr::UniformDie { sides } => {
            if *sides == 0 {
                Err(ValidationError::ZeroSidedDie)
            } else {
                Ok(())
            }
        }
        Expr::Die { faces } => {
            if faces.is_empty() {
                Err(ValidationError::EmptyFaces)
            } else if faces.iter().all(|face| face.weight == 0) {
                Err(ValidationError::ZeroWeightDie)
            } else {
                Ok(())
            }
        }
        Expr::Sum { children } => require_operands(expr, children),
        Expr::Product {
            children,
            combinator,
        } => {
            require_operands(expr, children)?;
            children
                .iter()
                .skip(1)
                .try_for_each(|operand| validate_constant_operand(*combinator, operand))
        }
        Expr::SelectHighest { keep, pool } | Expr::SelectLowest { keep, pool } => {
            require_operands(expr, pool)?;
            if *keep == 0 {
                Err(ValidationError::EmptySelection)
            } else if *keep > pool.len() {
                Err(ValidationError::SelectionExceedsPool {
                    keep: *keep,
                    pool: pool.len(),
                })
            } else {
                Ok(())
            }
        }
        Expr::Reroll { max_attempts, .. } => check_bound("max_attempts", *max_attempts, limits),
        Expr::Explode { max_depth, .. } => check_bound("max_depth", *max_depth, limits),
        Expr::Map { transform, .. } => transform.validate(),
        Expr::Compare { .. } => Ok(()),
        Expr::Tag { tag, .. } => require_tag_names(expr, [tag.as_str()]),
        Expr::TagRule {
            condition,
            transform,
            ..
        } => {
            require_tag_names(expr, condition.tag_names())?;
            transform.validate()
        }
        Expr::RemoveTags { tags, .. } => require_tag_names(expr, tags.iter().map(String::as_str)),
    }
}

fn require_tag_names<'t>(
    expr: &Expr,
    names: impl IntoIterator<Item = &'t str>,
) -> Result<(), ValidationError> {
    if names.into_iter().any(str::is_empty) {
        return Err(ValidationError::EmptyTagName {
            operator: expr.operator_name(),
        });
    }
    Ok(())
}

fn require_operands(expr: &Expr, children: &[Expr]) -> Result<(), ValidationError> {
    if children.is_empty() {
        return Err(ValidationError::EmptyOperands {
            operator: expr.operator_name(),
        });
    }
    Ok(())
}

// Non-constant operands are checked against their evaluated support instead.
fn validate_constant_operand(combinator: BinaryOp, operand: &Expr) -> Result<(), ValidationError> {
    match operand {
        Expr::Constant { value: 0 } if combinator.rejects_zero_divisor() => Err(
            ValidationError::division_by_zero(format!("'{}' operand", combinator)),
        ),
        Expr::Constant { value } if *value < 0 && combinator.rejects_negative_exponent() => {
            Err(ValidationError::NegativeExponent { exponent: *value })
        }
        _ => Ok(()),
    }
}

fn check_bound(field: &'static str, bound: u32, limits: &EvaluationLimits) -> Result<(), ValidationError> {
    if bound > limits.max_bound {
        return Err(ValidationError::BoundTooLarge {
            field,
            max: limits.max_bound,
            actual: bound,
        });
    }
    Ok(())
}
