//! # Record Module
//!
//! The text ⇄ typed boundary for table rows.
//!
//! ## Where Parsing Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Sheet row (all text)                                                   │
//! │  ["2025-03-01 09:12:00", "Expiry", "6291003", ..., "Pending Review"]    │
//! │       │                                                                 │
//! │       ▼  ItemRecord::set_text (parse: dates, numbers, money)            │
//! │  ItemRecord (typed) ──► filtering, display                              │
//! │       │                                                                 │
//! │       ▼  ItemRecord::text (format)                                      │
//! │  String-normalized cell ──► diffing, writing                            │
//! │                                                                         │
//! │  Appends go the other way through FlatRecord:                           │
//! │  PendingSubmission ──► FlatRecord [(header, text), ...] ──► store       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing outside this module converts cell text to numbers or dates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ValidationError;
use crate::money::Money;
use crate::numeric::{format_number, parse_finite, parse_or_zero};
use crate::types::Column;

/// Format of the `Date Submitted` column.
pub const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the `Expiry` column as written by the item forms.
pub const EXPIRY_FORMAT: &str = "%d-%b-%y";

const DATETIME_INPUT_FORMATS: [&str; 4] = [
    SUBMITTED_AT_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_INPUT_FORMATS: [&str; 4] = [EXPIRY_FORMAT, "%d-%b-%Y", "%Y-%m-%d", "%d/%m/%Y"];

// =============================================================================
// Date Parsing
// =============================================================================

/// Parses a sheet timestamp. Bare dates are read as midnight.
///
/// Returns `None` for blank or unparseable text; callers treat that as a
/// missing value, never as an error.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Parses a sheet date (`05-Mar-25`, `2025-03-05`, `05/03/2025`).
///
/// Timestamps are accepted too and truncated to their date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_INPUT_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

// =============================================================================
// Flat Record
// =============================================================================

/// An ordered list of `(field name, text)` pairs ready to append as a row.
///
/// Field order is significant: when a table has no header yet, the first
/// record's field names become the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    fields: Vec<(String, String)>,
}

impl FlatRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        FlatRecord::default()
    }

    /// Appends a field (builder style).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Field names in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Looks up a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Checks if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Serializes as a JSON object with fields in record order.
impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Item Record
// =============================================================================

/// The typed business columns of one Items table row.
///
/// Columns the sheet does not have keep their defaults (blank text, zero,
/// `None` dates). `form_type` stays free text because rows written by older
/// form variants may carry labels this build does not know.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub submitted_at: Option<NaiveDateTime>,
    pub form_type: String,
    pub barcode: String,
    pub item_name: String,
    pub unit: String,
    pub cf: f64,
    pub qty: f64,
    pub cost: Money,
    pub selling: Money,
    pub amount: Money,
    pub gp_pct: f64,
    pub expiry: Option<NaiveDate>,
    pub supplier: String,
    pub remarks: String,
    pub outlet: String,
    pub staff_name: String,
    pub action_took: String,
}

impl ItemRecord {
    /// Builds a record from a header row and one data row.
    ///
    /// Unknown headers are ignored. A short row (trailing blank cells
    /// trimmed by the store) leaves the missing columns at their defaults.
    pub fn from_cells(headers: &[String], cells: &[String]) -> Self {
        let mut record = ItemRecord::default();
        for (header, cell) in headers.iter().zip(cells.iter()) {
            if let Some(column) = Column::from_header(header) {
                record.set_text(column, cell);
            }
        }
        record
    }

    /// Parses raw cell text into the typed field for `column`.
    pub fn set_text(&mut self, column: Column, raw: &str) {
        match column {
            Column::DateSubmitted => self.submitted_at = parse_datetime(raw),
            Column::FormType => self.form_type = raw.trim().to_string(),
            Column::Barcode => self.barcode = raw.trim().to_string(),
            Column::ItemName => self.item_name = raw.trim().to_string(),
            Column::Unit => self.unit = raw.trim().to_string(),
            Column::Cf => self.cf = parse_or_zero(raw),
            Column::Qty => self.qty = parse_or_zero(raw),
            Column::Cost => self.cost = Money::parse_lenient(raw),
            Column::Selling => self.selling = Money::parse_lenient(raw),
            Column::Amount => self.amount = Money::parse_lenient(raw),
            Column::GpPct => self.gp_pct = parse_or_zero(raw),
            Column::Expiry => self.expiry = parse_date(raw),
            Column::Supplier => self.supplier = raw.trim().to_string(),
            Column::Remarks => self.remarks = raw.trim().to_string(),
            Column::Outlet => self.outlet = raw.trim().to_string(),
            Column::StaffName => self.staff_name = raw.trim().to_string(),
            Column::ActionTook => self.action_took = raw.trim().to_string(),
        }
    }

    /// Like [`set_text`](Self::set_text), but rejects text a typed column
    /// cannot read instead of falling back to blank or zero.
    ///
    /// Used for user edits: a typo must not overwrite a stored cell. Blank
    /// input clears the cell.
    pub fn try_set_text(&mut self, column: Column, raw: &str) -> Result<(), ValidationError> {
        let trimmed = raw.trim();
        let readable = trimmed.is_empty()
            || match column {
                Column::DateSubmitted => parse_datetime(trimmed).is_some(),
                Column::Expiry => parse_date(trimmed).is_some(),
                Column::Cf
                | Column::Qty
                | Column::Cost
                | Column::Selling
                | Column::Amount
                | Column::GpPct => parse_finite(trimmed).is_some(),
                _ => true,
            };

        if !readable {
            return Err(ValidationError::InvalidFormat {
                field: column.header().to_string(),
                reason: format!("cannot read '{}'", trimmed),
            });
        }
        self.set_text(column, raw);
        Ok(())
    }

    /// String-normalized value of `column`, as it would be written back.
    pub fn text(&self, column: Column) -> String {
        match column {
            Column::DateSubmitted => self
                .submitted_at
                .map(|dt| dt.format(SUBMITTED_AT_FORMAT).to_string())
                .unwrap_or_default(),
            Column::FormType => self.form_type.clone(),
            Column::Barcode => self.barcode.clone(),
            Column::ItemName => self.item_name.clone(),
            Column::Unit => self.unit.clone(),
            Column::Cf => format_number(self.cf),
            Column::Qty => format_number(self.qty),
            Column::Cost => self.cost.to_string(),
            Column::Selling => self.selling.to_string(),
            Column::Amount => self.amount.to_string(),
            Column::GpPct => format_number(self.gp_pct),
            Column::Expiry => self
                .expiry
                .map(|d| d.format(EXPIRY_FORMAT).to_string())
                .unwrap_or_default(),
            Column::Supplier => self.supplier.clone(),
            Column::Remarks => self.remarks.clone(),
            Column::Outlet => self.outlet.clone(),
            Column::StaffName => self.staff_name.clone(),
            Column::ActionTook => self.action_took.clone(),
        }
    }
}
