//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  0.1 + 0.2 = 0.30000000000000004 in binary floating point.          │
//! │  Prices in floats need an epsilon patch at every display site.      │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Cents                                        │
//! │    Every price, discount, tax and total is an i64 cent count.       │
//! │    Percentages are basis points; rounding happens exactly once      │
//! │    per operation, half away from zero.                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use merch_core::money::Money;
//!
//! let price = Money::from_cents(4999); // 49.99
//! let line = price * 2;                // 99.98
//! assert_eq!(line.to_string(), "99.98");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: refunds and discount deltas can go negative mid-math
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Display without symbol**: the currency symbol is a presentation
///   concern, the frontend owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use merch_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
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

    /// Parses a decimal string ("49.99", "6.5", "12") into Money.
    ///
    /// Returns `None` for anything that is not a plain non-negative
    /// decimal number. Fractional digits beyond the third are ignored;
    /// the third digit rounds the cent half-up ("1.005" → 101 cents).
    ///
    /// ## Example
    /// ```rust
    /// use merch_core::money::Money;
    ///
    /// assert_eq!(Money::parse("6.50"), Some(Money::from_cents(650)));
    /// assert_eq!(Money::parse("12"), Some(Money::from_cents(1200)));
    /// assert_eq!(Money::parse("-3"), None);
    /// assert_eq!(Money::parse("abc"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Money> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };

        // Keep three fractional digits so cent rounding can see a
        // half-cent remainder.
        let mut mills: i64 = 0;
        for (i, c) in frac_part.chars().take(3).enumerate() {
            mills += (c as i64 - '0' as i64) * 10_i64.pow(2 - i as u32);
        }

        let total_mills = whole.checked_mul(1000)?.checked_add(mills)?;
        Some(Money((total_mills + 5) / 10))
    }

    /// Returns the given percentage portion of this amount, where the
    /// percentage is expressed in basis points (1000 bps = 10%).
    ///
    /// Rounds half away from zero, matching the storefront's
    /// round-to-cent semantics without the float epsilon dance.
    ///
    /// ## Example
    /// ```rust
    /// use merch_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(10648); // 106.48
    /// assert_eq!(subtotal.take_percent_bps(700).cents(), 745); // 7% tax
    /// ```
    pub fn take_percent_bps(&self, bps: u32) -> Money {
        // i128 intermediate prevents overflow on large amounts
        let num = self.0 as i128 * bps as i128;
        let rounded = if num >= 0 {
            (num + 5000) / 10000
        } else {
            (num - 5000) / 10000
        };
        Money(rounded as i64)
    }

    /// Calculates tax on this amount.
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.take_percent_bps(rate.bps())
    }

    /// Subtracts `other`, flooring the result at zero.
    ///
    /// Used wherever a fixed-amount discount must never drive a price
    /// or total negative.
    #[inline]
    pub fn sub_floor_zero(&self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }

    /// Multiplies by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two-decimal fixed string, no currency symbol.
///
/// `Money::from_cents(4999)` displays as `49.99`. The frontend prepends
/// the symbol so localization stays out of the core.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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

// =============================================================================
// Unit Tests
// =============================================================================
