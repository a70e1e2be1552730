//! # Numeric Helpers
//!
//! Parse/format boundary for the non-monetary numbers of an Items row
//! (Qty, CF, GP%). Sheet cells are text; these helpers are the only place
//! text turns into numbers and back.

/// Rounds to 2 decimal places (the precision written to the sheet).
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses a number, treating anything unparseable as zero.
///
/// Mirrors how sheet cells are read: a blank or garbled `Qty` cell is
/// displayed as `0` instead of failing the whole load.
///
/// ## Example
/// ```rust
/// use shelfline_core::numeric::parse_or_zero;
///
/// assert_eq!(parse_or_zero(" 12 "), 12.0);
/// assert_eq!(parse_or_zero("n/a"), 0.0);
/// ```
pub fn parse_or_zero(input: &str) -> f64 {
    parse_finite(input).unwrap_or(0.0)
}

/// Parses a finite number, ignoring whitespace and thousands separators.
pub fn parse_finite(input: &str) -> Option<f64> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formats a number the way it is written to the sheet.
///
/// Whole numbers drop the fraction, everything else uses the shortest
/// exact representation.
///
/// ```text
/// 50.0  → "50"
/// 33.33 → "33.33"
/// -0.0  → "0"
/// ```
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}
