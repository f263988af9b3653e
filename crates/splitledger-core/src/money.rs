//! # Money Module
//!
//! Provides the `Money` type for every amount the ledger stores.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With doubles and a 0.01 tolerance:                                     │
//! │    800.0 / 3 = 266.666...  → every balance carries drift                │
//! │    "zero" means |x| < 0.01 → every comparison needs an epsilon          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    80000 cents / 3 = 26666 cents, remainder 2 cents                    │
//! │    The remainder is handed out explicitly, sums stay exact             │
//! │    "within 0.01" becomes plain integer equality                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use splitledger_core::money::Money;
//!
//! let lunch = Money::from_major(800);
//! let share = Money::from_cents(20_000);
//! assert_eq!(lunch - share * 3, share);
//! assert_eq!(share.to_string(), "200.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::types::{Percentage, Rounding};

// =============================================================================
// Money Type
// =============================================================================

/// Represents an amount in the smallest currency unit (cents, paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: Debt matrix entries are signed by construction
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as a bare integer** of cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use splitledger_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole major units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50, not -4.50.
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

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    ///
    /// One cent is the ledger tolerance, so anything that is not exactly
    /// zero cents is a real balance.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Addition that returns `None` instead of overflowing.
    ///
    /// The `+` operator is for amounts already known to be in range;
    /// anything built from caller input goes through the checked forms.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtraction that returns `None` instead of overflowing.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums `amounts`, or `None` if any partial sum overflows.
    pub fn checked_sum<'a, I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(*amount))
    }

    /// Divides this amount into `parts` equal pieces using `rounding`.
    ///
    /// The result times `parts` may differ from `self` by up to `parts`
    /// cents; the split engine hands that residual out separately.
    ///
    /// ```rust
    /// use splitledger_core::money::Money;
    /// use splitledger_core::types::Rounding;
    ///
    /// let total = Money::from_cents(1000);
    /// assert_eq!(total.divide(3, Rounding::Truncate).cents(), 333);
    /// assert_eq!(Money::from_cents(1001).divide(2, Rounding::HalfUp).cents(), 501);
    /// ```
    pub fn divide(&self, parts: usize, rounding: Rounding) -> Money {
        debug_assert!(parts > 0, "cannot divide into zero parts");
        Money::from_cents(rounding.apply(self.0 as i128, parts as i128) as i64)
    }

    /// Takes `pct` of this amount using `rounding`.
    ///
    /// ## Implementation
    /// Integer math on basis points: `cents * bps / 10000`, widened to
    /// i128 so large totals cannot overflow.
    ///
    /// ```rust
    /// use splitledger_core::money::Money;
    /// use splitledger_core::types::{Percentage, Rounding};
    ///
    /// let trip = Money::from_major(1000);
    /// let share = trip.percentage(Percentage::from_whole(60), Rounding::Truncate);
    /// assert_eq!(share, Money::from_major(600));
    /// ```
    pub fn percentage(&self, pct: Percentage, rounding: Rounding) -> Money {
        let numerator = self.0 as i128 * pct.bps() as i128;
        Money::from_cents(rounding.apply(numerator, Percentage::FULL_BPS as i128) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimal places and no currency symbol.
///
/// Reports prepend the configured symbol themselves.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
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

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_arithmetic() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_cents(5).checked_sub(Money::from_cents(7)),
            Some(Money::from_cents(-2))
        );

        let amounts = [max, max, Money::from_cents(3)];
        assert_eq!(Money::checked_sum(&amounts), None);
        assert_eq!(
            Money::checked_sum(&[Money::from_cents(10), Money::from_cents(20)]),
            Some(Money::from_cents(30))
        );
    }

    #[test]
    fn test_constructors() {
        assert_eq!(Money::from_major(800).cents(), 80_000);
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);

        let money = Money::from_cents(1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(20_000).to_string(), "200.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_divide_rounding_modes() {
        let total = Money::from_cents(1001);
        assert_eq!(total.divide(2, Rounding::Truncate).cents(), 500);
        assert_eq!(total.divide(2, Rounding::HalfUp).cents(), 501);
        // 500.5 -> 500 (even)
        assert_eq!(total.divide(2, Rounding::HalfEven).cents(), 500);
        // 501.5 -> 502 (even)
        assert_eq!(Money::from_cents(1003).divide(2, Rounding::HalfEven).cents(), 502);
    }

    #[test]
    fn test_percentage_of_amount() {
        let total = Money::from_cents(1000);
        assert_eq!(
            total.percentage(Percentage::from_bps(3333), Rounding::Truncate).cents(),
            333
        );
        assert_eq!(
            total.percentage(Percentage::from_bps(3335), Rounding::HalfUp).cents(),
            334
        );
    }

    /// $10.00 split three ways loses a cent unless someone absorbs it.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_cents(1000);
        let third = ten.divide(3, Rounding::Truncate);
        let reconstructed = third * 3;

        assert_eq!(reconstructed.cents(), 999);
        assert_eq!((ten - reconstructed).cents(), 1);
    }
}
