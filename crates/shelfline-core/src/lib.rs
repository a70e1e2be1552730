//! # shelfline-core: Pure Business Logic for Shelfline
//!
//! This crate holds the change-tracking and reconciliation logic behind the
//! outlet forms. It has zero I/O dependencies: every table read or write
//! happens in `shelfline-sheets`, which hands plain rows in and takes plain
//! records out.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shelfline Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    shelfline CLI (Session)                      │   │
//! │  │    lookup, submit, actions list/set, feedback                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shelfline-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │  buffer   │  │ snapshot  │  │  filter   │  │   │
//! │  │   │  lookup   │  │  Pending  │  │  diff     │  │  ViewFilt │  │   │
//! │  │   │           │  │  GP% math │  │  ChangeSet│  │  windows  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               shelfline-sheets (Store Layer)                    │   │
//! │  │       tables, write gate, row-addressed writer, catalog files   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (RowIndex, FormType, Column, CatalogEntry)
//! - [`money`] - Integer-cent money and GP% math
//! - [`numeric`] - Number parse/format helpers for sheet cells
//! - [`record`] - Typed Items rows and flat append records
//! - [`catalog`] - Barcode lookup
//! - [`buffer`] - Pending submissions awaiting a batch append
//! - [`snapshot`] - Snapshot, working copy and diff
//! - [`filter`] - Read-only filtered views
//! - [`feedback`] - Customer feedback entries
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use shelfline_core::{Catalog, CatalogEntry};
//!
//! let catalog = Catalog::new(vec![CatalogEntry {
//!     barcode: "6291003".to_string(),
//!     name: "Milk 1L".to_string(),
//!     supplier: "Al Rawabi".to_string(),
//!     unit: "CASE".to_string(),
//!     conversion_factor: 12.0,
//! }]);
//!
//! // Whitespace around a scanned barcode is ignored
//! let entry = catalog.lookup(" 6291003 ").unwrap();
//! assert_eq!(entry.name, "Milk 1L");
//!
//! // A miss is not an error: the form falls back to manual entry
//! assert!(catalog.lookup("999").is_none());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod buffer;
pub mod catalog;
pub mod error;
pub mod feedback;
pub mod filter;
pub mod money;
pub mod numeric;
pub mod record;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use buffer::{EntryFieldSet, PendingSubmission, SubmissionBuffer, SubmissionDraft};
pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ValidationError};
pub use feedback::{FeedbackDraft, FeedbackEntry};
pub use filter::{ExpiryWindow, ViewFilter};
pub use money::Money;
pub use record::{FlatRecord, ItemRecord};
pub use snapshot::{diff, CellChange, ChangeSet, RemoteRow, TableSchema, TableSnapshot, WorkingCopy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Physical row number of the first data row (row 1 holds the header).
pub const FIRST_DATA_ROW: u32 = 2;

/// Maximum pieces accepted on a single entry.
///
/// Catches a scanned barcode landing in the quantity box.
pub const MAX_QUANTITY: i64 = 99_999;

/// Status values a manager may record in `Action Took`.
pub const ACTION_OPTIONS: [&str; 6] = [
    "Pending Review",
    "Ordered",
    "Rejected - Duplicate",
    "Rejected - Out of Stock",
    "Needs Clarification",
    "Completed",
];

/// [`ACTION_OPTIONS`] as owned strings, the shape configuration uses.
pub fn default_action_options() -> Vec<String> {
    ACTION_OPTIONS.iter().map(|s| s.to_string()).collect()
}
