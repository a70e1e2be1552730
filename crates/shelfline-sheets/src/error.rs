//! # Store Error Types
//!
//! Error types for table reads and writes.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Backend failure (io::Error, csv::Error, calamine::Error)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds operation context                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in CLI) ← ConnectionError / WriteError / ConfigError        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Terminal shows the cause; buffer and edits stay intact for retry      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Tabular store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached at all.
    ///
    /// ## When This Occurs
    /// - Session opened offline (no table configured)
    /// - Table file's directory does not exist
    /// - Backend reports itself unreachable
    #[error("Store connection failed: {0}")]
    ConnectionFailed(String),

    /// A write call was attempted and rejected.
    ///
    /// ## When This Occurs
    /// - Backend refuses an append or batch update
    /// - Temp file cannot be persisted over the table file
    #[error("{operation} failed: {cause}")]
    WriteFailed { operation: String, cause: String },

    /// Only part of an append batch reached the table.
    ///
    /// The caller must keep its buffer: nothing tells which rows to drop.
    #[error("Partial write: {written} of {total} rows stored")]
    PartialWrite { written: usize, total: usize },

    /// A required column is absent from a source file.
    ///
    /// ## When This Occurs
    /// - Catalog file without `Item Bar Code`, `Item Name` or `LP Supplier`
    #[error("{file} is missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    /// A write targets a column the table does not have.
    #[error("Column '{0}' does not exist in the table")]
    UnknownColumn(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet workbook could not be read.
    #[error("Workbook error: {0}")]
    Workbook(String),
}

impl StoreError {
    /// Creates a WriteFailed error for a named operation.
    pub fn write_failed(operation: impl Into<String>, cause: impl ToString) -> Self {
        StoreError::WriteFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }

    /// Whether the error means the store is unreachable, as opposed to a
    /// single failed operation.
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::ConnectionFailed(_))
    }
}

impl From<calamine::Error> for StoreError {
    fn from(err: calamine::Error) -> Self {
        StoreError::Workbook(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::write_failed("append_rows", "quota exceeded");
        assert_eq!(err.to_string(), "append_rows failed: quota exceeded");

        let err = StoreError::PartialWrite {
            written: 1,
            total: 3,
        };
        assert_eq!(err.to_string(), "Partial write: 1 of 3 rows stored");
    }

    #[test]
    fn test_is_connection() {
        assert!(StoreError::ConnectionFailed("offline".into()).is_connection());
        assert!(!StoreError::UnknownColumn("Notes".into()).is_connection());
    }
}
