//! Ledger integers in sign-magnitude form.
//!
//! Ledgers return both `uint256` and `int256` values. Neither fits in the
//! other, so measured integers keep a sign flag next to a 256-bit magnitude.
//! Every value of either type is representable, and the difference of any
//! two unsigned values is too.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use alloy_primitives::{I256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// A signed integer with a 256-bit magnitude.
///
/// Zero is never negative, so equal values compare equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Integer {
    negative: bool,
    magnitude: U256,
}

impl Integer {
    pub const ZERO: Self = Self {
        negative: false,
        magnitude: U256::ZERO,
    };

    pub fn new(negative: bool, magnitude: U256) -> Self {
        Self {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Absolute value.
    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    /// `self + rhs`, or `None` if the magnitude overflows.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        if self.negative == rhs.negative {
            let magnitude = self.magnitude.checked_add(rhs.magnitude)?;
            return Some(Self::new(self.negative, magnitude));
        }
        Some(match self.magnitude.cmp(&rhs.magnitude) {
            Ordering::Less => Self::new(rhs.negative, rhs.magnitude - self.magnitude),
            _ => Self::new(self.negative, self.magnitude - rhs.magnitude),
        })
    }

    /// `self - rhs`, or `None` if the magnitude overflows.
    ///
    /// Never `None` when both operands are non-negative.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.checked_add(-rhs)
    }
}

impl Neg for Integer {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(!self.negative, self.magnitude)
    }
}

impl From<U256> for Integer {
    fn from(value: U256) -> Self {
        Self::new(false, value)
    }
}

impl From<I256> for Integer {
    fn from(value: I256) -> Self {
        let (sign, magnitude) = value.into_sign_and_abs();
        Self::new(sign.is_negative(), magnitude)
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self::new(value < 0, U256::from(value.unsigned_abs()))
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(f, "{}", self.magnitude)
    }
}

impl FromStr for Integer {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidInteger(s.to_string()));
        }
        let magnitude = U256::from_str_radix(digits, 10)
            .map_err(|_| TypeError::IntegerOutOfRange(s.to_string()))?;
        Ok(Self::new(negative, magnitude))
    }
}

// Decimal strings: JSON numbers cannot carry 256-bit values.
impl Serialize for Integer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn full_unsigned_range() {
        let max = Integer::from(U256::MAX);
        assert!(!max.is_negative());
        assert_eq!(max.to_string(), U256::MAX.to_string());
        assert_eq!(Integer::from(I256::MIN).magnitude(), U256::from(1u8) << 255usize);
        assert!(Integer::from(I256::MIN).is_negative());
    }

    #[test]
    fn differences_of_extreme_unsigned_values() {
        let max = Integer::from(U256::MAX);
        let zero = Integer::ZERO;
        let five = Integer::from(5i64);

        let up = max.checked_sub(zero).unwrap();
        assert_eq!(up, max);
        let down = five.checked_sub(max).unwrap();
        assert!(down.is_negative());
        assert_eq!(down.magnitude(), U256::MAX - U256::from(5));
        assert_eq!(max.checked_sub(max), Some(Integer::ZERO));
    }

    #[test]
    fn overflow_outside_unsigned_operands() {
        let max = Integer::from(U256::MAX);
        assert_eq!(max.checked_sub(Integer::from(-1i64)), None);
        assert_eq!(max.checked_add(max), None);
    }

    #[test]
    fn zero_is_not_negative() {
        assert_eq!(-Integer::ZERO, Integer::ZERO);
        assert_eq!(Integer::new(true, U256::ZERO), Integer::ZERO);
        assert_eq!("-0".parse::<Integer>().unwrap(), Integer::ZERO);
    }

    #[test]
    fn parse_errors() {
        assert!(matches!("".parse::<Integer>(), Err(TypeError::InvalidInteger(_))));
        assert!(matches!("-".parse::<Integer>(), Err(TypeError::InvalidInteger(_))));
        assert!(matches!("0x10".parse::<Integer>(), Err(TypeError::InvalidInteger(_))));
        let too_big = format!("{}0", U256::MAX);
        assert!(matches!(
            too_big.parse::<Integer>(),
            Err(TypeError::IntegerOutOfRange(_))
        ));
    }

    proptest! {
        #[test]
        fn matches_machine_arithmetic(a in any::<i64>(), b in any::<i64>()) {
            let expected = i128::from(a) - i128::from(b);
            let diff = Integer::from(a).checked_sub(Integer::from(b)).unwrap();
            prop_assert_eq!(diff.to_string(), expected.to_string());
        }

        #[test]
        fn display_parses_back(a in any::<i64>()) {
            let value = Integer::from(a);
            prop_assert_eq!(value.to_string().parse::<Integer>().unwrap(), value);
        }
    }
}
