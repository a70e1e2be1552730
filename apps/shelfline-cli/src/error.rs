//! # App Error Type
//!
//! Unified error type for command handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shelfline                              │
//! │                                                                         │
//! │  Command handler                                                        │
//! │  Result<T, AppError>                                                    │
//! │         │                                                               │
//! │         ├── ValidationError ──────────────► VALIDATION_ERROR            │
//! │         ├── CoreError::UnknownRow ────────► NOT_FOUND                   │
//! │         ├── StoreError::ConnectionFailed ─► CONNECTION_ERROR            │
//! │         ├── StoreError::WriteFailed ──────► WRITE_ERROR                 │
//! │         ├── StoreError::MissingColumn ────► CONFIG_ERROR                │
//! │         └── ConfigError ──────────────────► CONFIG_ERROR                │
//! │                                                                         │
//! │  main(): prints "[CODE] message", exits non-zero                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use shelfline_core::{CoreError, ValidationError};
use shelfline_sheets::StoreError;

use crate::config::ConfigError;

/// Error returned from command handlers.
///
/// ## Serialization
/// With `--json` a failure is printed as:
/// ```json
/// {
///   "code": "CONNECTION_ERROR",
///   "message": "Store connection failed: directory data does not exist"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes, one per failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced row or entry does not exist
    NotFound,

    /// Input validation failed; nothing changed
    ValidationError,

    /// Store unreachable; only local buffering works
    ConnectionError,

    /// A write was rejected; state kept for retry
    WriteError,

    /// Configuration or source file is unusable
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorCode::NotFound => 3,
            ErrorCode::ValidationError => 2,
            ErrorCode::ConnectionError => 4,
            ErrorCode::WriteError => 5,
            ErrorCode::ConfigError => 6,
            ErrorCode::Internal => 1,
        }
    }
}

impl AppError {
    /// Creates a new app error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::NotFound, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts store errors to app errors.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::ConnectionFailed(_) => ErrorCode::ConnectionError,
            StoreError::WriteFailed { .. } | StoreError::PartialWrite { .. } => ErrorCode::WriteError,
            StoreError::UnknownColumn(_) => ErrorCode::WriteError,
            StoreError::MissingColumn { .. } | StoreError::Workbook(_) => ErrorCode::ConfigError,
            StoreError::Io(_) | StoreError::Csv(_) => {
                tracing::error!(error = %err, "Store I/O failed");
                ErrorCode::Internal
            }
        };
        AppError::new(code, err.to_string())
    }
}

/// Converts core errors to app errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::IndexOutOfBounds { .. } | CoreError::UnknownRow(_) => {
                AppError::not_found(err.to_string())
            }
            CoreError::ColumnNotEditable(_) | CoreError::NoSnapshot => {
                AppError::validation(err.to_string())
            }
            CoreError::Validation(e) => AppError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::validation(format!("Invalid JSON input: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for command handlers.
pub type AppResult<T> = Result<T, AppError>;
