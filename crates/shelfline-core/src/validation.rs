//! # Validation Module
//!
//! Input validation for the outlet forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (CLI flags / entry file)                           │
//! │  └── Type checks (deserialization)                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Required text fields                                              │
//! │  ├── CF must be a positive number                                      │
//! │  └── Rating / action status in allowed sets                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store                                                        │
//! │  └── Header alignment (unknown columns rejected before writing)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cost and selling price are deliberately NOT validated here: they parse
//! leniently to zero (see [`crate::money::Money::parse_lenient`]).

use crate::error::ValidationError;
use crate::numeric::parse_finite;
use crate::MAX_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Text Validators
// =============================================================================

/// Validates that a text field is non-blank and returns it trimmed.
///
/// ## Example
/// ```rust
/// use shelfline_core::validation::require_text;
///
/// assert_eq!(require_text("Barcode", " 629100 ").unwrap(), "629100");
/// assert!(require_text("Barcode", "   ").is_err());
/// ```
pub fn require_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a conversion factor, which must be a positive number.
///
/// ## Example
/// ```rust
/// use shelfline_core::validation::parse_conversion_factor;
///
/// assert_eq!(parse_conversion_factor("12").unwrap(), 12.0);
/// assert!(parse_conversion_factor("dozen").is_err());
/// assert!(parse_conversion_factor("0").is_err());
/// ```
pub fn parse_conversion_factor(raw: &str) -> ValidationResult<f64> {
    let cf = parse_finite(raw).ok_or_else(|| ValidationError::InvalidFormat {
        field: "CF".to_string(),
        reason: "must be a valid number".to_string(),
    })?;

    if cf <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "CF".to_string(),
        });
    }

    Ok(cf)
}

/// Validates a submitted quantity (pieces).
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Qty".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "Qty".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a customer rating (1 to 5 stars).
pub fn validate_rating(rating: u8) -> ValidationResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "Rating".to_string(),
            min: 1,
            max: 5,
        });
    }
    Ok(())
}

// =============================================================================
// Choice Validators
// =============================================================================

/// Checks a value against an allowed set, returning the canonical spelling.
///
/// Matching ignores case and surrounding whitespace so `"completed"` maps to
/// `"Completed"`. An empty allowed set accepts any non-blank value.
pub fn validate_choice(field: &str, value: &str, allowed: &[String]) -> ValidationResult<String> {
    let value = require_text(field, value)?;

    if allowed.is_empty() {
        return Ok(value);
    }

    allowed
        .iter()
        .find(|option| option.eq_ignore_ascii_case(&value))
        .cloned()
        .ok_or_else(|| ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: allowed.to_vec(),
        })
}
