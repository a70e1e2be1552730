//! # shelfline-sheets: Tabular Store Layer for Shelfline
//!
//! Every read and write against an external table goes through this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shelfline Data Flow                              │
//! │                                                                         │
//! │  Session (shelfline-cli)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 shelfline-sheets (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  SheetTable   │    │ RowAddressed  │    │   Catalog    │  │   │
//! │  │   │  (table.rs)   │    │    Writer     │    │   source     │  │   │
//! │  │   │               │    │ (writer.rs)   │    │              │  │   │
//! │  │   │ write gate    │◄───│ commit cells  │    │ .csv / .xlsx │  │   │
//! │  │   │ read cache    │    │ append rows   │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │  TabularStore                                      │   │
//! │  │   ┌───────┴───────┐    ┌───────────────┐                       │   │
//! │  │   │   CsvTable    │    │  MemoryTable  │                       │   │
//! │  │   └───────────────┘    └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`table`] - `TabularStore` trait and the `SheetTable` handle
//! - [`writer`] - Row-addressed cell commits and header-aligned appends
//! - [`csv_table`] - CSV file backend
//! - [`memory`] - In-memory backend with failure injection
//! - [`catalog_source`] - Catalog file loading
//! - [`address`] - Cell addresses (A1 notation)
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelfline_sheets::{CsvTable, RowAddressedWriter, SheetTable};
//!
//! let items = SheetTable::new("Items", CsvTable::new("data/items.csv"));
//!
//! // Append the buffer in one call
//! RowAddressedWriter::new(&items).flush(&mut buffer).await?;
//!
//! // Load, edit, diff, commit
//! let mut snapshot = items.load_snapshot(false).await?;
//! let changes = shelfline_core::diff(&snapshot, &working, &editable);
//! RowAddressedWriter::new(&items).commit_changes(snapshot.schema(), &changes).await?;
//! snapshot.acknowledge(&changes);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod address;
pub mod catalog_source;
pub mod csv_table;
pub mod error;
pub mod memory;
pub mod table;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use address::{CellAddress, CellUpdate};
pub use catalog_source::load_catalog;
pub use csv_table::CsvTable;
pub use error::{StoreError, StoreResult};
pub use memory::{FailureMode, MemoryTable};
pub use table::{SheetTable, TabularStore, DEFAULT_CACHE_TTL};
pub use writer::RowAddressedWriter;
