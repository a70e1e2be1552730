//! # Domain Types
//!
//! Core domain types used throughout Shelfline.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogEntry   │   │    FormType     │   │     Column      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  barcode        │   │  Expiry         │   │  Date Submitted │       │
//! │  │  name           │   │  Damages        │   │  Barcode ...    │       │
//! │  │  supplier       │   │  Near Expiry    │   │  Action Took    │       │
//! │  │  unit, cf       │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                        ┌─────────────────┐                              │
//! │                        │    RowIndex     │  1-based sheet row,          │
//! │                        │  2 = first data │  the only row identity       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Row Index
// =============================================================================

/// Physical 1-based row number of a data row in the external table.
///
/// ## Why Not Vec Position?
/// Rows are filtered and sorted for display. The row index is assigned once
/// at load time (header is row 1, first data row is 2) and is the only key
/// joining the working copy back to the snapshot and to the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIndex(u32);

impl RowIndex {
    /// Creates a row index from a physical row number.
    #[inline]
    pub const fn new(row: u32) -> Self {
        RowIndex(row)
    }

    /// Returns the physical row number.
    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Form Type
// =============================================================================

/// Which outlet form produced an Items row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormType {
    /// Item has already expired on the shelf.
    #[default]
    Expiry,
    /// Item is damaged; no expiry date is recorded.
    Damages,
    /// Item is close to its expiry date.
    #[serde(rename = "Near Expiry")]
    NearExpiry,
}

impl FormType {
    /// Every form type, in the order the forms are offered.
    pub const ALL: [FormType; 3] = [FormType::Expiry, FormType::Damages, FormType::NearExpiry];

    /// Label as written to the `Form Type` column.
    pub const fn label(&self) -> &'static str {
        match self {
            FormType::Expiry => "Expiry",
            FormType::Damages => "Damages",
            FormType::NearExpiry => "Near Expiry",
        }
    }

    /// Whether entries of this form carry an expiry date.
    pub const fn has_expiry(&self) -> bool {
        !matches!(self, FormType::Damages)
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FormType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "expiry" => Ok(FormType::Expiry),
            "damages" | "damage" => Ok(FormType::Damages),
            "near expiry" => Ok(FormType::NearExpiry),
            _ => Err(ValidationError::NotAllowed {
                field: "Form Type".to_string(),
                allowed: FormType::ALL.iter().map(|t| t.label().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Items Table Columns
// =============================================================================

/// A known column of the Items table.
///
/// Serialized as its header text so configuration files read naturally
/// (`editable_columns = ["Action Took"]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "Date Submitted")]
    DateSubmitted,
    #[serde(rename = "Form Type")]
    FormType,
    Barcode,
    #[serde(rename = "Item Name")]
    ItemName,
    Unit,
    #[serde(rename = "CF")]
    Cf,
    Qty,
    Cost,
    Selling,
    Amount,
    #[serde(rename = "GP%")]
    GpPct,
    Expiry,
    Supplier,
    Remarks,
    Outlet,
    #[serde(rename = "Staff Name")]
    StaffName,
    #[serde(rename = "Action Took")]
    ActionTook,
}

impl Column {
    /// Every known column, in canonical sheet order.
    pub const ALL: [Column; 17] = [
        Column::DateSubmitted,
        Column::FormType,
        Column::Barcode,
        Column::ItemName,
        Column::Unit,
        Column::Cf,
        Column::Qty,
        Column::Cost,
        Column::Selling,
        Column::Amount,
        Column::GpPct,
        Column::Expiry,
        Column::Supplier,
        Column::Remarks,
        Column::Outlet,
        Column::StaffName,
        Column::ActionTook,
    ];

    /// Header text in row 1 of the sheet.
    pub const fn header(&self) -> &'static str {
        match self {
            Column::DateSubmitted => "Date Submitted",
            Column::FormType => "Form Type",
            Column::Barcode => "Barcode",
            Column::ItemName => "Item Name",
            Column::Unit => "Unit",
            Column::Cf => "CF",
            Column::Qty => "Qty",
            Column::Cost => "Cost",
            Column::Selling => "Selling",
            Column::Amount => "Amount",
            Column::GpPct => "GP%",
            Column::Expiry => "Expiry",
            Column::Supplier => "Supplier",
            Column::Remarks => "Remarks",
            Column::Outlet => "Outlet",
            Column::StaffName => "Staff Name",
            Column::ActionTook => "Action Took",
        }
    }

    /// Resolves a header cell to a known column (surrounding spaces ignored).
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL.into_iter().find(|c| c.header() == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = ValidationError;

    /// Accepts header text in any case (`"action took"`, `"GP%"`) and
    /// snake_case names (`"action_took"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', " ").to_lowercase();
        Column::ALL
            .into_iter()
            .find(|c| c.header().to_lowercase() == wanted)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "column".to_string(),
                reason: format!("unknown column '{}'", s.trim()),
            })
    }
}

// =============================================================================
// Catalog Entry
// =============================================================================

/// A reference catalog record, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Normalized barcode (lookup key).
    pub barcode: String,

    /// Item name shown on the form.
    pub name: String,

    /// Supplier (`LP Supplier` in the catalog file).
    pub supplier: String,

    /// Stocking unit (CASE, PKT, ...). Empty if the catalog has none.
    pub unit: String,

    /// Conversion factor from stocking unit to pieces.
    pub conversion_factor: f64,
}
