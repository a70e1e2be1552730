//! # Error Types
//!
//! Domain-specific error types for shelfline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shelfline-core errors (this file)                                     │
//! │  ├── CoreError        - Buffer, snapshot and edit failures             │
//! │  └── ValidationError  - Form input validation failures                 │
//! │                                                                         │
//! │  shelfline-sheets errors (separate crate)                              │
//! │  └── StoreError       - Connection / write failures                    │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - What the user sees                             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → Terminal               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A barcode that is not in the catalog is NOT an error: lookups return
//! `Option` and the caller falls back to manual entry.

use thiserror::Error;

use crate::types::RowIndex;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Buffer index does not point at a pending entry.
    ///
    /// ## When This Occurs
    /// - Deleting an entry that was already removed
    /// - Deleting from an empty buffer
    #[error("No pending entry at position {index} (buffer holds {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Row index is not part of the working copy.
    ///
    /// ## When This Occurs
    /// - Editing a row number that was never loaded
    /// - Editing a row after the table was reloaded without it
    #[error("Row {0} is not part of the loaded table")]
    UnknownRow(RowIndex),

    /// Attempt to edit a display-only column.
    #[error("Column '{0}' is read-only")]
    ColumnNotEditable(String),

    /// A tracking operation was requested before any table was loaded.
    #[error("No table snapshot loaded")]
    NoSnapshot,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when form input doesn't meet requirements. They are
/// recovered locally: the user is re-prompted and no state changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., CF that is not a number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates a Required error for a field label.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::IndexOutOfBounds { index: 3, len: 2 };
        assert_eq!(
            err.to_string(),
            "No pending entry at position 3 (buffer holds 2)"
        );

        let err = CoreError::UnknownRow(RowIndex::new(7));
        assert_eq!(err.to_string(), "Row 7 is not part of the loaded table");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("Staff Name").to_string(),
            "Staff Name is required"
        );

        let err = ValidationError::MustBePositive {
            field: "CF".to_string(),
        };
        assert_eq!(err.to_string(), "CF must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("Barcode").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
