//! Convenience constructors and operator overloads for building trees.
//!
//! Rule catalogs build expressions with these rather than spelling out the
//! enum variants, e.g. `Expr::dice(3, Expr::die(6)) + 2`.

use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

use crate::domain::distribution::Outcome;

use super::{BinaryOp, ComparisonOperator, Expr, Face, Predicate, TagCondition, Transform};

impl Expr {
    /// A fixed value.
    pub fn constant(value: Outcome) -> Self {
        Expr::Constant { value }
    }

    /// A fair die over `1..=sides`.
    pub fn die(sides: u32) -> Self {
        Expr::UniformDie { sides }
    }

    /// A die with explicitly weighted faces.
    pub fn weighted(faces: impl IntoIterator<Item = (Outcome, u64)>) -> Self {
        Expr::Die {
            faces: faces
                .into_iter()
                .map(|(value, weight)| Face::new(value, weight))
                .collect(),
        }
    }

    /// A fair die with the listed faces, e.g. a Fate die `[-1, -1, 0, 0, 1, 1]`.
    pub fn faces(values: impl IntoIterator<Item = Outcome>) -> Self {
        Self::weighted(values.into_iter().map(|value| (value, 1)))
    }

    /// Sum of the children.
    pub fn sum(children: Vec<Expr>) -> Self {
        Expr::Sum { children }
    }

    /// Left fold of the children under `combinator`.
    pub fn product(children: Vec<Expr>, combinator: BinaryOp) -> Self {
        Expr::Product {
            children,
            combinator,
        }
    }

    /// `count` independent copies of `die` added together ("3d6").
    pub fn dice(count: usize, die: Expr) -> Self {
        match count {
            0 => Expr::constant(0),
            1 => die,
            _ => Expr::Sum {
                children: vec![die; count],
            },
        }
    }

    /// Sum of the `keep` highest of `count` copies of `die` ("4d6kh3").
    pub fn keep_highest(keep: usize, count: usize, die: Expr) -> Self {
        Expr::SelectHighest {
            keep,
            pool: vec![die; count],
        }
    }

    /// Sum of the `keep` lowest of `count` copies of `die`.
    pub fn keep_lowest(keep: usize, count: usize, die: Expr) -> Self {
        Expr::SelectLowest {
            keep,
            pool: vec![die; count],
        }
    }

    /// Sum of the `keep` highest results of a heterogeneous pool.
    pub fn select_highest(keep: usize, pool: Vec<Expr>) -> Self {
        Expr::SelectHighest { keep, pool }
    }

    /// Sum of the `keep` lowest results of a heterogeneous pool.
    pub fn select_lowest(keep: usize, pool: Vec<Expr>) -> Self {
        Expr::SelectLowest { keep, pool }
    }

    /// Largest of the children.
    pub fn max_of(children: Vec<Expr>) -> Self {
        Self::product(children, BinaryOp::Max)
    }

    /// Smallest of the children.
    pub fn min_of(children: Vec<Expr>) -> Self {
        Self::product(children, BinaryOp::Min)
    }

    /// Rerolls this expression at most `max_attempts` times while `predicate` holds.
    pub fn reroll(self, predicate: Predicate, max_attempts: u32) -> Self {
        Expr::Reroll {
            child: Box::new(self),
            predicate,
            max_attempts,
        }
    }

    /// Rolls again and adds at most `max_depth` times while `predicate` holds.
    pub fn explode(self, predicate: Predicate, max_depth: u32) -> Self {
        Expr::Explode {
            child: Box::new(self),
            predicate,
            max_depth,
        }
    }

    /// Rewrites every outcome with `transform`.
    pub fn map(self, transform: Transform) -> Self {
        Expr::Map {
            child: Box::new(self),
            transform,
        }
    }

    /// 1 when `self <operator> other` holds, otherwise 0.
    pub fn compare(self, operator: ComparisonOperator, other: Expr) -> Self {
        Expr::Compare {
            left: Box::new(self),
            right: Box::new(other),
            operator,
        }
    }

    pub fn less_than(self, other: Expr) -> Self {
        self.compare(ComparisonOperator::Less, other)
    }

    pub fn at_most(self, other: Expr) -> Self {
        self.compare(ComparisonOperator::LessOrEqual, other)
    }

    pub fn equal_to(self, other: Expr) -> Self {
        self.compare(ComparisonOperator::Equal, other)
    }

    pub fn not_equal_to(self, other: Expr) -> Self {
        self.compare(ComparisonOperator::NotEqual, other)
    }

    pub fn at_least(self, other: Expr) -> Self {
        self.compare(ComparisonOperator::GreaterOrEqual, other)
    }

    pub fn greater_than(self, other: Expr) -> Self {
        self.compare(ComparisonOperator::Greater, other)
    }

    /// Tags outcomes matching `predicate`, e.g. a natural 20 as "crit".
    pub fn tag(self, tag: impl Into<String>, predicate: Predicate) -> Self {
        Expr::Tag {
            child: Box::new(self),
            tag: tag.into(),
            predicate,
        }
    }

    /// Applies `transform` to outcomes whose tags satisfy `condition`.
    pub fn tag_rule(self, condition: TagCondition, transform: Transform) -> Self {
        Expr::TagRule {
            child: Box::new(self),
            condition,
            transform,
        }
    }

    pub fn remove_tags<S: Into<String>>(self, tags: impl IntoIterator<Item = S>) -> Self {
        Expr::RemoveTags {
            child: Box::new(self),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn clear_tags(self) -> Self {
        Expr::RemoveTags {
            child: Box::new(self),
            tags: Vec::new(),
        }
    }

    /// `self ** exponent`.
    pub fn pow(self, exponent: Expr) -> Self {
        self.fold_with(BinaryOp::Power, exponent)
    }

    /// `self // divisor`, rounding toward negative infinity.
    pub fn floor_div(self, divisor: Expr) -> Self {
        self.fold_with(BinaryOp::FloorDivide, divisor)
    }

    /// Appends `rhs` to a left fold, flattening chains of the same combinator.
    fn fold_with(self, combinator: BinaryOp, rhs: Expr) -> Self {
        match self {
            Expr::Product {
                mut children,
                combinator: existing,
            } if existing == combinator => {
                children.push(rhs);
                Expr::Product {
                    children,
                    combinator,
                }
            }
            lhs => Expr::Product {
                children: vec![lhs, rhs],
                combinator,
            },
        }
    }
}

impl From<Outcome> for Expr {
    fn from(value: Outcome) -> Self {
        Expr::constant(value)
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        match self {
            Expr::Sum { mut children } => {
                children.push(rhs);
                Expr::Sum { children }
            }
            lhs => Expr::Sum {
                children: vec![lhs, rhs],
            },
        }
    }
}

impl Add<Outcome> for Expr {
    type Output = Expr;

    fn add(self, rhs: Outcome) -> Expr {
        self + Expr::constant(rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        self.fold_with(BinaryOp::Subtract, rhs)
    }
}

impl Sub<Outcome> for Expr {
    type Output = Expr;

    fn sub(self, rhs: Outcome) -> Expr {
        self.fold_with(BinaryOp::Subtract, Expr::constant(rhs))
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        self.fold_with(BinaryOp::Multiply, rhs)
    }
}

impl Mul<Outcome> for Expr {
    type Output = Expr;

    fn mul(self, rhs: Outcome) -> Expr {
        self.fold_with(BinaryOp::Multiply, Expr::constant(rhs))
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        self.fold_with(BinaryOp::Divide, rhs)
    }
}

impl Div<Outcome> for Expr {
    type Output = Expr;

    fn div(self, rhs: Outcome) -> Expr {
        self.fold_with(BinaryOp::Divide, Expr::constant(rhs))
    }
}

impl Rem for Expr {
    type Output = Expr;

    fn rem(self, rhs: Expr) -> Expr {
        self.fold_with(BinaryOp::Modulo, rhs)
    }
}

impl Rem<Outcome> for Expr {
    type Output = Expr;

    fn rem(self, rhs: Outcome) -> Expr {
        self.fold_with(BinaryOp::Modulo, Expr::constant(rhs))
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.map(Transform::Negate)
    }
}

impl Add<Expr> for Outcome {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::constant(self) + rhs
    }
}

impl Sub<Expr> for Outcome {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::constant(self) - rhs
    }
}

impl Mul<Expr> for Outcome {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::constant(self) * rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dice_builds_sum_of_copies() {
        let three_d6 = Expr::dice(3, Expr::die(6));
        match three_d6 {
            Expr::Sum { children } => {
                assert_eq!(children.len(), 3);
                assert!(children.iter().all(|c| *c == Expr::die(6)));
            }
            other => panic!("expected sum, got {:?}", other),
        }
        assert_eq!(Expr::dice(0, Expr::die(6)), Expr::constant(0));
        assert_eq!(Expr::dice(1, Expr::die(6)), Expr::die(6));
    }

    #[test]
    fn addition_flattens_into_one_sum() {
        let expr = Expr::die(6) + Expr::die(4) + 2;
        match expr {
            Expr::Sum { children } => assert_eq!(children.len(), 3),
            other => panic!("expected sum, got {:?}", other),
        }
    }

    #[test]
    fn subtraction_flattens_left_fold() {
        let expr = Expr::die(20) - 3 - 1;
        assert_eq!(
            expr,
            Expr::product(
                vec![Expr::die(20), Expr::constant(3), Expr::constant(1)],
                BinaryOp::Subtract
            )
        );
    }

    #[test]
    fn mixed_operators_nest() {
        let expr = (Expr::die(6) * 2) - 1;
        match expr {
            Expr::Product {
                children,
                combinator: BinaryOp::Subtract,
            } => assert_eq!(children[0].operator_name(), "product"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn constant_on_left_side() {
        let expr = 7 + Expr::die(6);
        assert_eq!(expr, Expr::sum(vec![Expr::constant(7), Expr::die(6)]));
    }

    #[test]
    fn negation_maps() {
        assert_eq!(-Expr::die(4), Expr::die(4).map(Transform::Negate));
    }

    #[test]
    fn keep_highest_replicates_die() {
        match Expr::keep_highest(3, 4, Expr::die(6)) {
            Expr::SelectHighest { keep, pool } => {
                assert_eq!(keep, 3);
                assert_eq!(pool.len(), 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tag_helpers_wrap_the_child() {
        let crit = Expr::die(20).tag("crit", Predicate::equals(20));
        let doubled = crit.clone().tag_rule(TagCondition::has("crit"), Transform::Scale { factor: 2 });
        match doubled {
            Expr::TagRule { child, .. } => assert_eq!(*child, crit),
            other => panic!("unexpected {:?}", other),
        }
        match Expr::die(6).remove_tags(["crit"]) {
            Expr::RemoveTags { tags, .. } => assert_eq!(tags, vec!["crit".to_string()]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn comparison_helpers_pick_operator() {
        let expr = Expr::die(20).less_than(Expr::constant(15));
        match expr {
            Expr::Compare { operator, .. } => assert_eq!(operator, ComparisonOperator::Less),
            other => panic!("unexpected {:?}", other),
        }
    }
}
