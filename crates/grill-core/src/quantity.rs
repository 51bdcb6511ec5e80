//! # Quantity Module
//!
//! Fixed-point ingredient quantities with two decimal places.
//!
//! ## Why Integer Hundredths?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ingredient stock is measured in kg, g, l, ml, lb or whole units and    │
//! │  recipes ask for fractions (0.25 kg of beef per burger).                │
//! │                                                                         │
//! │  Floats drift:  10.0 - 0.1 * 3 = 9.700000000000001                      │
//! │                                                                         │
//! │  OUR SOLUTION: store hundredths in an i64, exactly like Money stores    │
//! │  cents.  10.00 kg = 1000,  0.25 kg = 25                                 │
//! │                                                                         │
//! │  Availability becomes exact integer division:                           │
//! │    floor(10.00 / 0.25) = 1000 / 25 = 40 burgers                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! JSON carries quantities as decimal strings (`"12.50"`). Plain JSON
//! numbers are accepted on input and rounded to hundredths.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Number of stored units per whole unit of measure.
pub const SCALE: i64 = 100;

/// An amount of an ingredient, in hundredths of its unit of measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Quantity(i64);

impl Quantity {
    /// Largest stock, threshold, package size or recipe ratio the schema
    /// stores: 99,999,999.99.
    pub const MAX: Quantity = Quantity(9_999_999_999);

    /// Creates a quantity from hundredths (`250` = 2.50).
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Creates a quantity from a whole number of units.
    #[inline]
    pub const fn from_whole(units: i64) -> Self {
        Quantity(units * SCALE)
    }

    /// Returns the raw value in hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a per-unit quantity by a number of units sold.
    ///
    /// Returns `None` on overflow.
    #[inline]
    pub fn checked_times(&self, units: i64) -> Option<Self> {
        self.0.checked_mul(units).map(Quantity)
    }

    /// Adds, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Quantity) -> Option<Self> {
        self.0.checked_add(other.0).map(Quantity)
    }

    /// Subtracts, returning `None` if the result would be negative.
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::quantity::Quantity;
    ///
    /// let stock = Quantity::from_whole(10);
    /// assert_eq!(stock.checked_deduct(Quantity::from_whole(4)), Some(Quantity::from_whole(6)));
    /// assert_eq!(stock.checked_deduct(Quantity::from_whole(11)), None);
    /// ```
    #[inline]
    pub fn checked_deduct(&self, amount: Quantity) -> Option<Self> {
        let rest = self.0.checked_sub(amount.0)?;
        (rest >= 0).then_some(Quantity(rest))
    }

    /// How many whole portions of `per_unit` fit in this quantity.
    ///
    /// Non-positive stock fits zero portions. `per_unit` must be positive;
    /// a non-positive `per_unit` also yields zero.
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::quantity::Quantity;
    ///
    /// let beef = Quantity::from_hundredths(1000);     // 10.00 kg
    /// let per_burger = Quantity::from_hundredths(30); //  0.30 kg
    /// assert_eq!(beef.portions_of(per_burger), 33);
    /// ```
    #[inline]
    pub fn portions_of(&self, per_unit: Quantity) -> i64 {
        if self.0 <= 0 || per_unit.0 <= 0 {
            return 0;
        }
        self.0 / per_unit.0
    }

    /// Clamps negative values to zero.
    #[inline]
    pub fn clamp_non_negative(self) -> Self {
        Quantity(self.0.max(0))
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Errors when parsing a decimal quantity string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseQuantityError {
    #[error("empty quantity")]
    Empty,
    #[error("invalid digit in quantity")]
    InvalidDigit,
    #[error("at most two decimal places are allowed")]
    TooPrecise,
    #[error("quantity is too large")]
    Overflow,
}

impl FromStr for Quantity {
    type Err = ParseQuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        if body.is_empty() {
            return Err(ParseQuantityError::Empty);
        }

        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(ParseQuantityError::Empty);
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ParseQuantityError::InvalidDigit);
        }
        if frac.len() > 2 {
            return Err(ParseQuantityError::TooPrecise);
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseQuantityError::Overflow)?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| ParseQuantityError::InvalidDigit)? * 10,
            _ => frac.parse().map_err(|_| ParseQuantityError::InvalidDigit)?,
        };

        let value = whole
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac))
            .ok_or(ParseQuantityError::Overflow)?;

        Ok(Quantity(if negative { -value } else { value }))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / SCALE as u64, abs % SCALE as u64)
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct QuantityVisitor;

impl<'de> Visitor<'de> for QuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal quantity with at most two decimal places")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
        v.checked_mul(SCALE)
            .map(Quantity)
            .ok_or_else(|| E::custom(ParseQuantityError::Overflow))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(SCALE))
            .map(Quantity)
            .ok_or_else(|| E::custom(ParseQuantityError::Overflow))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Quantity, E> {
        let scaled = (v * SCALE as f64).round();
        if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
            return Err(E::custom(ParseQuantityError::Overflow));
        }
        Ok(Quantity(scaled as i64))
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_strings() {
        assert_eq!("12.50".parse::<Quantity>(), Ok(Quantity::from_hundredths(1250)));
        assert_eq!("12.5".parse::<Quantity>(), Ok(Quantity::from_hundredths(1250)));
        assert_eq!("7".parse::<Quantity>(), Ok(Quantity::from_whole(7)));
        assert_eq!(".25".parse::<Quantity>(), Ok(Quantity::from_hundredths(25)));
        assert_eq!("-3.05".parse::<Quantity>(), Ok(Quantity::from_hundredths(-305)));
        assert_eq!(" 0.01 ".parse::<Quantity>(), Ok(Quantity::from_hundredths(1)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Quantity>(), Err(ParseQuantityError::Empty));
        assert_eq!(".".parse::<Quantity>(), Err(ParseQuantityError::Empty));
        assert_eq!("1.234".parse::<Quantity>(), Err(ParseQuantityError::TooPrecise));
        assert_eq!("1,5".parse::<Quantity>(), Err(ParseQuantityError::InvalidDigit));
        assert_eq!("ten".parse::<Quantity>(), Err(ParseQuantityError::InvalidDigit));
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantity::from_hundredths(1250).to_string(), "12.50");
        assert_eq!(Quantity::from_hundredths(5).to_string(), "0.05");
        assert_eq!(Quantity::from_hundredths(-305).to_string(), "-3.05");
        assert_eq!(Quantity::zero().to_string(), "0.00");
    }

    #[test]
    fn test_serde_accepts_strings_and_numbers() {
        let q: Quantity = serde_json::from_str("\"0.25\"").unwrap();
        assert_eq!(q, Quantity::from_hundredths(25));

        let q: Quantity = serde_json::from_str("3").unwrap();
        assert_eq!(q, Quantity::from_whole(3));

        let q: Quantity = serde_json::from_str("0.3").unwrap();
        assert_eq!(q, Quantity::from_hundredths(30));

        assert_eq!(
            serde_json::to_string(&Quantity::from_hundredths(1000)).unwrap(),
            "\"10.00\""
        );
    }

    #[test]
    fn test_portions_of_floors() {
        let stock = Quantity::from_whole(10);
        assert_eq!(stock.portions_of(Quantity::from_whole(1)), 10);
        assert_eq!(stock.portions_of(Quantity::from_whole(3)), 3);
        assert_eq!(stock.portions_of(Quantity::from_hundredths(25)), 40);
        assert_eq!(Quantity::zero().portions_of(Quantity::from_whole(1)), 0);
        assert_eq!(Quantity::from_whole(-2).portions_of(Quantity::from_whole(1)), 0);
        assert_eq!(stock.portions_of(Quantity::zero()), 0);
    }

    #[test]
    fn test_checked_deduct_never_goes_negative() {
        let stock = Quantity::from_hundredths(100);
        assert_eq!(stock.checked_deduct(Quantity::from_hundredths(100)), Some(Quantity::zero()));
        assert_eq!(stock.checked_deduct(Quantity::from_hundredths(101)), None);
    }

    #[test]
    fn test_checked_times() {
        let per_unit = Quantity::from_hundredths(25);
        assert_eq!(per_unit.checked_times(4), Some(Quantity::from_whole(1)));
        assert_eq!(Quantity::from_hundredths(i64::MAX).checked_times(2), None);
    }

    #[test]
    fn test_checked_add_overflow() {
        let big = Quantity::from_hundredths(i64::MAX - 1);
        assert_eq!(big.checked_add(Quantity::from_hundredths(1)), Some(Quantity::from_hundredths(i64::MAX)));
        assert_eq!(big.checked_add(Quantity::from_hundredths(2)), None);
        assert_eq!(Quantity::MAX.to_string(), "99999999.99");
    }

    #[test]
    fn test_sum() {
        let total: Quantity = [25, 50, 25]
            .into_iter()
            .map(Quantity::from_hundredths)
            .sum();
        assert_eq!(total, Quantity::from_whole(1));
    }
}
