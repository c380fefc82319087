//! Probability value object (exact rational in [0, 1]).

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use std::str::FromStr;

use super::ValidationError;

/// An exact probability stored as a reduced fraction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Probability(BigRational);

impl Probability {
    /// Probability zero.
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// Probability one.
    pub fn one() -> Self {
        Self(BigRational::one())
    }

    /// Creates a probability from a count out of a total.
    ///
    /// The total must be non-zero; callers guarantee this by construction.
    pub(crate) fn from_counts(count: &BigUint, total: &BigUint) -> Self {
        Self(BigRational::new(
            BigInt::from(count.clone()),
            BigInt::from(total.clone()),
        ))
    }

    /// Creates `numerator / denominator`, returning error on a zero denominator
    /// or a value above one.
    pub fn try_ratio(numerator: u64, denominator: u64) -> Result<Self, ValidationError> {
        if denominator == 0 {
            return Err(ValidationError::ZeroTotal);
        }
        if numerator > denominator {
            return Err(ValidationError::ProbabilityAboveOne {
                numerator,
                denominator,
            });
        }
        Ok(Self(BigRational::new(numerator.into(), denominator.into())))
    }

    /// Creates `numerator / denominator`.
    ///
    /// # Panics
    /// Panics if the denominator is zero.
    pub fn ratio(numerator: u64, denominator: u64) -> Self {
        Self(BigRational::new(numerator.into(), denominator.into()))
    }

    /// Returns the underlying exact fraction.
    pub fn value(&self) -> &BigRational {
        &self.0
    }

    /// Returns the probability of the complementary event.
    pub fn complement(&self) -> Self {
        Self(BigRational::one() - &self.0)
    }

    /// Returns true if this is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if this is exactly one.
    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    /// Returns the nearest f64, for display and charting only.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    /// Divides by a non-zero probability, used for conditioning.
    pub(crate) fn conditioned_on(&self, given: &Probability) -> Self {
        Self(&self.0 / &given.0)
    }
}

impl Default for Probability {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Probability {
    type Output = Probability;

    fn add(self, rhs: Probability) -> Probability {
        Probability(self.0 + rhs.0)
    }
}

impl Mul for Probability {
    type Output = Probability;

    fn mul(self, rhs: Probability) -> Probability {
        Probability(self.0 * rhs.0)
    }
}

impl Sum for Probability {
    fn sum<I: Iterator<Item = Probability>>(iter: I) -> Self {
        iter.fold(Probability::zero(), |acc, p| acc + p)
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl Serialize for Probability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Probability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let value = BigRational::from_str(&raw).map_err(serde::de::Error::custom)?;
        if value < BigRational::zero() || value > BigRational::one() {
            return Err(serde::de::Error::custom(format!(
                "probability {} outside [0, 1]",
                raw
            )));
        }
        Ok(Probability(value))
    }
}
