//! Euro amounts using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in euros.
///
/// The shop trades only in EUR, so no currency code is carried. On the wire
/// the backend uses plain JSON numbers (`25`, `12.5`); they are read into a
/// [`Decimal`] so cart totals never accumulate float error.
///
/// ```
/// use delegends_core::Money;
///
/// let haircut = Money::from_major(25);
/// let beard = Money::from_cents(1250);
/// assert_eq!((haircut + beard).to_string(), "€37.50");
/// assert_eq!((beard * 2).to_string(), "€25.00");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    /// Zero euros.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount in euros.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole euros.
    #[must_use]
    pub fn from_major(euros: i64) -> Self {
        Self(Decimal::from(euros))
    }

    /// Euro cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Distance between two amounts, regardless of sign.
    #[must_use]
    pub fn abs_diff(self, other: Self) -> Decimal {
        (self.0 - other.0).abs()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "€{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_cents() {
        assert_eq!(Money::from_major(30).to_string(), "€30.00");
        assert_eq!(Money::from_cents(1999).to_string(), "€19.99");
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(price, Money::from_cents(1250));
        let whole: Money = serde_json::from_str("25").unwrap();
        assert_eq!(whole, Money::from_major(25));
    }

    #[test]
    fn test_sum_and_multiply() {
        let total: Money = [Money::from_major(10), Money::from_cents(550)]
            .iter()
            .sum();
        assert_eq!(total, Money::from_cents(1550));
        assert_eq!(Money::from_cents(1550) * 3, Money::from_cents(4650));
    }

    #[test]
    fn test_abs_diff() {
        let a = Money::from_major(25);
        let b = Money::from_major(32);
        assert_eq!(a.abs_diff(b), Decimal::from(7));
        assert_eq!(b.abs_diff(a), Decimal::from(7));
    }
}
