//! Outcome transforms applied by `Expr::Map` and `Expr::TagRule`.

use serde::{Deserialize, Serialize};

use crate::domain::distribution::{Outcome, OutcomeDistribution};
use crate::domain::foundation::{DomainError, ValidationError};

use super::operator::{divide, modulo, Rounding};
use super::Predicate;

/// Arithmetic or conditional rewrite of a single outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    Identity,
    Offset { amount: Outcome },
    Scale { factor: Outcome },
    Negate,
    Absolute,
    Divide { divisor: Outcome, rounding: Rounding },
    Modulo { modulus: Outcome },
    Clamp { min: Outcome, max: Outcome },
    Replace { value: Outcome },
    /// Applies `then` when the predicate holds and `otherwise` when it does not.
    When {
        predicate: Predicate,
        then: Box<Transform>,
        otherwise: Box<Transform>,
    },
    /// Applies each step in order.
    Chain { steps: Vec<Transform> },
}

impl Transform {
    /// Applies `then` only to outcomes matching `predicate`.
    pub fn when(predicate: Predicate, then: Transform) -> Self {
        Transform::When {
            predicate,
            then: Box::new(then),
            otherwise: Box::new(Transform::Identity),
        }
    }

    /// Checks parameters that make the transform undefined for every input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Transform::Divide { divisor: 0, .. } => {
                Err(ValidationError::division_by_zero("divide transform"))
            }
            Transform::Modulo { modulus: 0 } => {
                Err(ValidationError::division_by_zero("modulo transform"))
            }
            Transform::Clamp { min, max } if min > max => Err(ValidationError::EmptyRange {
                min: *min,
                max: *max,
            }),
            Transform::When {
                then, otherwise, ..
            } => {
                then.validate()?;
                otherwise.validate()
            }
            Transform::Chain { steps } => steps.iter().try_for_each(Transform::validate),
            _ => Ok(()),
        }
    }

    /// Rewrites `outcome`; relative predicates resolve against `context`.
    pub fn apply(
        &self,
        outcome: Outcome,
        context: &OutcomeDistribution,
    ) -> Result<Outcome, DomainError> {
        match self {
            Transform::Identity => Ok(outcome),
            Transform::Offset { amount } => outcome
                .checked_add(*amount)
                .ok_or_else(|| DomainError::overflow("offset")),
            Transform::Scale { factor } => outcome
                .checked_mul(*factor)
                .ok_or_else(|| DomainError::overflow("scale")),
            Transform::Negate => outcome
                .checked_neg()
                .ok_or_else(|| DomainError::overflow("negation")),
            Transform::Absolute => outcome
                .checked_abs()
                .ok_or_else(|| DomainError::overflow("absolute value")),
            Transform::Divide { divisor, rounding } => divide(outcome, *divisor, *rounding),
            Transform::Modulo { modulus } => modulo(outcome, *modulus),
            Transform::Clamp { min, max } => Ok(outcome.clamp(*min, *max)),
            Transform::Replace { value } => Ok(*value),
            Transform::When {
                predicate,
                then,
                otherwise,
            } => {
                if predicate.matches(outcome, context) {
                    then.apply(outcome, context)
                } else {
                    otherwise.apply(outcome, context)
                }
            }
            Transform::Chain { steps } => steps
                .iter()
                .try_fold(outcome, |value, step| step.apply(value, context)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn d20() -> OutcomeDistribution {
        OutcomeDistribution::uniform(20).unwrap()
    }

    #[test]
    fn arithmetic_transforms() {
        let ctx = d20();
        assert_eq!(Transform::Offset { amount: 7 }.apply(3, &ctx).unwrap(), 10);
        assert_eq!(Transform::Scale { factor: -2 }.apply(3, &ctx).unwrap(), -6);
        assert_eq!(Transform::Negate.apply(3, &ctx).unwrap(), -3);
        assert_eq!(Transform::Absolute.apply(-3, &ctx).unwrap(), 3);
        assert_eq!(Transform::Clamp { min: 2, max: 5 }.apply(9, &ctx).unwrap(), 5);
        assert_eq!(Transform::Replace { value: 0 }.apply(9, &ctx).unwrap(), 0);
        assert_eq!(
            Transform::Divide {
                divisor: 2,
                rounding: Rounding::Ceiling
            }
            .apply(7, &ctx)
            .unwrap(),
            4
        );
    }

    #[test]
    fn critical_hit_doubles_on_maximum_face() {
        let ctx = d20();
        let crit = Transform::when(Predicate::Maximum, Transform::Scale { factor: 2 });
        assert_eq!(crit.apply(20, &ctx).unwrap(), 40);
        assert_eq!(crit.apply(19, &ctx).unwrap(), 19);
    }

    #[test]
    fn chain_applies_in_order() {
        let ctx = d20();
        let chain = Transform::Chain {
            steps: vec![Transform::Offset { amount: 1 }, Transform::Scale { factor: 3 }],
        };
        assert_eq!(chain.apply(2, &ctx).unwrap(), 9);
    }

    #[test]
    fn validate_rejects_zero_divisor_and_empty_clamp() {
        assert!(Transform::Modulo { modulus: 0 }.validate().is_err());
        assert!(Transform::Clamp { min: 5, max: 1 }.validate().is_err());
        let nested = Transform::when(
            Predicate::Maximum,
            Transform::Divide {
                divisor: 0,
                rounding: Rounding::Floor,
            },
        );
        assert!(nested.validate().is_err());
        assert!(Transform::Identity.validate().is_ok());
    }

    #[test]
    fn overflow_is_reported() {
        let err = Transform::Negate.apply(Outcome::MIN, &d20()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ArithmeticOverflow);
    }
}
