//! # Money Module
//!
//! Provides the `Money` type for cost, selling price and line amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Cost 0.1 × Qty 3 in floating point = 0.30000000000000004              │
//! │                                                                         │
//! │  Staff type "12.349" into a cost box. The sheet shows 12.35.           │
//! │  The Amount column must agree with what the sheet shows.               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    parse "12.349" → 1235 cents (rounded to the nearest cent)           │
//! │    Amount = 1235 × qty, exact                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shelfline_core::money::Money;
//!
//! let cost = Money::parse_lenient("10");
//! let selling = Money::parse_lenient("15.00");
//! assert_eq!(cost.multiply_quantity(3).map(|m| m.cents()), Some(3000));
//! assert_eq!(Money::gross_profit_pct(cost, selling), 50.0);
//!
//! // Malformed input never blocks an entry
//! assert!(Money::parse_lenient("abc").is_zero());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::numeric::{parse_finite, round2};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents / fils).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Form "Cost" ────┬──► PendingSubmission.cost ──► Amount = cost × qty    │
/// │                  │                                                      │
/// │  Form "Selling" ─┴──► PendingSubmission.selling ──► GP%                 │
/// │                                                                         │
/// │  Items sheet: written as plain decimals ("12.5", "0")                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses user input, tolerating garbage.
    ///
    /// ## Numeric Tolerance Policy
    /// A malformed cost must not block entry of an otherwise valid row:
    /// anything that does not parse to a finite number becomes zero.
    /// Surrounding whitespace and thousands separators are ignored.
    ///
    /// ## Example
    /// ```rust
    /// use shelfline_core::money::Money;
    ///
    /// assert_eq!(Money::parse_lenient(" 12.349 ").cents(), 1235);
    /// assert_eq!(Money::parse_lenient("1,200").cents(), 120000);
    /// assert_eq!(Money::parse_lenient("").cents(), 0);
    /// assert_eq!(Money::parse_lenient("NaN").cents(), 0);
    /// ```
    pub fn parse_lenient(input: &str) -> Self {
        parse_finite(input).map_or(Money::zero(), Money::from_decimal)
    }

    /// Converts a decimal amount, rounding to the nearest cent.
    ///
    /// Values beyond the `i64` cent range saturate.
    pub fn from_decimal(value: f64) -> Self {
        Money((value * 100.0).round() as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal (for sheet output and GP% math).
    #[inline]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity. `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use shelfline_core::money::Money;
    ///
    /// let cost = Money::from_cents(299);
    /// assert_eq!(cost.multiply_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX).multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Gross profit percentage: `(selling - cost) / cost × 100`.
    ///
    /// ## Zero Cost
    /// A zero cost yields `0.0` instead of dividing by zero. Result is
    /// rounded to 2 decimals, the precision written to the sheet.
    ///
    /// ```text
    /// cost 10.00, selling 15.00 → 50.0
    /// cost  0.00, selling  5.00 →  0.0
    /// cost 20.00, selling 15.00 → -25.0
    /// ```
    pub fn gross_profit_pct(cost: Money, selling: Money) -> f64 {
        if cost.is_zero() {
            return 0.0;
        }
        // f64 keeps saturated inputs from overflowing the subtraction
        let margin = selling.0 as f64 - cost.0 as f64;
        round2(margin / cost.0 as f64 * 100.0)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal output, the way values appear in the Items sheet.
///
/// Whole amounts print without a fraction (`"15"`), others with the
/// shortest exact form (`"12.5"`, `"0.35"`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}
