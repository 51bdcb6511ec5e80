//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Ingredient costs are package prices split over package sizes:          │
//! │    $25.00 for a 10.00 kg box → $2.50 per kg                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + explicit rounding                        │
//! │    2500 cents × 100 / 1000 hundredths = 250 cents                       │
//! │    Rounding happens in exactly one place: `Money::prorate`              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use grill_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line_total = price * 2;          // $21.98
//! let total = line_total + Money::from_cents(500);
//! assert_eq!(total.cents(), 2698);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price_cents ──► OrderLine.unit_price_cents (snapshot)          │
/// │                               │                                         │
/// │                               ▼                                         │
/// │                          line_total ──► Order.total_cents ──► Invoice   │
/// │                                                                         │
/// │  Ingredient.package_price_cents ──► cost per unit ──► stock value       │
/// │                                          │                              │
/// │                                          └──► recipe line cost          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
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

    /// Multiplies money by a quantity of whole units.
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(899); // Classic Burger
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 2697);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Scales this amount by `numerator / denominator`, rounding half up.
    ///
    /// Used wherever a package price is spread over a package size:
    /// `price × amount / size`, with both sizes in hundredths.
    ///
    /// Returns zero when `denominator` is not positive.
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::money::Money;
    ///
    /// // $25.00 box of 10.00 kg, 0.30 kg used
    /// let cost = Money::from_cents(2500).prorate(30, 1000);
    /// assert_eq!(cost.cents(), 75);
    /// ```
    pub fn prorate(&self, numerator: i64, denominator: i64) -> Money {
        if denominator <= 0 {
            return Money::zero();
        }
        // i128 so price × stock cannot overflow
        let scaled = self.0 as i128 * numerator as i128;
        Money(div_round_half_up(scaled, denominator as i128) as i64)
    }

    /// Sums `price × numerator / denominator` terms and rounds once.
    ///
    /// Each term is carried to a millionth of a cent, so values that are
    /// each worth half a cent add up instead of each rounding up. Terms with
    /// a non-positive denominator count as zero.
    ///
    /// ## Example
    /// ```rust
    /// use grill_core::money::Money;
    ///
    /// // Three ingredients each worth half a cent
    /// let half_cent = (Money::from_cents(1), 100, 200);
    /// let total = Money::sum_prorated([half_cent, half_cent, half_cent]);
    /// assert_eq!(total.cents(), 2);
    /// ```
    pub fn sum_prorated<I>(terms: I) -> Money
    where
        I: IntoIterator<Item = (Money, i64, i64)>,
    {
        const FINE: i128 = 1_000_000;

        let fine_total: i128 = terms
            .into_iter()
            .filter(|(_, _, denominator)| *denominator > 0)
            .map(|(price, numerator, denominator)| {
                div_round_half_up(price.0 as i128 * numerator as i128 * FINE, denominator as i128)
            })
            .sum();

        Money(div_round_half_up(fine_total, FINE) as i64)
    }
}

/// Integer division rounding half away from zero. `den` must be positive.
fn div_round_half_up(scaled: i128, den: i128) -> i128 {
    let half = den / 2;
    if scaled >= 0 {
        (scaled + half) / den
    } else {
        (scaled - half) / den
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as "$10.99". Invoices and logs use this format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
