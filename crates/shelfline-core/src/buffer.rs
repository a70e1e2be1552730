//! # Submission Buffer
//!
//! Pending item entries collected on a form before one batch append.
//!
//! ## Entry Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SubmissionDraft (raw form input)                                       │
//! │       │                                                                 │
//! │       ▼  add(): validate, trim, compute Amount + GP%, stamp time        │
//! │  PendingSubmission (frozen values, no row index)                        │
//! │       │                                                                 │
//! │       ├── remove(i) ──► dropped                                         │
//! │       │                                                                 │
//! │       ▼  records() ──► writer.append_rows ──► clear() on full success  │
//! │  RemoteRow (only after a later reload assigns it a row index)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Freeze Derived Values?
//! Amount and GP% are computed when the entry is added. A catalog or price
//! change afterwards does not rewrite entries already in the buffer.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::numeric::{format_number, round2};
use crate::record::{FlatRecord, EXPIRY_FORMAT, SUBMITTED_AT_FORMAT};
use crate::types::{CatalogEntry, Column, FormType};
use crate::validation::{parse_conversion_factor, require_text, validate_quantity, ValidationResult};

// =============================================================================
// Field Set
// =============================================================================

/// Which optional fields the item form collects.
///
/// Older form variants have no Unit/CF inputs; for those the fields are not
/// validated and not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFieldSet {
    pub unit_and_cf: bool,
}

impl Default for EntryFieldSet {
    fn default() -> Self {
        EntryFieldSet { unit_and_cf: true }
    }
}

// =============================================================================
// Draft
// =============================================================================

/// Raw values as typed (or auto-filled) on the item form.
///
/// Numeric inputs that staff type freely (CF, cost, selling) stay text here
/// so the validation rules decide how strict to be with each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionDraft {
    pub form_type: FormType,
    pub barcode: String,
    pub item_name: String,
    pub unit: String,
    pub cf: String,
    pub quantity: i64,
    pub cost: String,
    pub selling: String,
    pub expiry: Option<NaiveDate>,
    pub supplier: String,
    pub remarks: String,
    pub outlet: String,
    pub staff_name: String,
}

impl SubmissionDraft {
    /// Fills blank descriptive fields from a catalog hit.
    ///
    /// Anything the user already typed is kept.
    pub fn apply_catalog(&mut self, entry: &CatalogEntry) {
        fn fill(field: &mut String, value: &str) {
            if field.trim().is_empty() {
                *field = value.to_string();
            }
        }

        fill(&mut self.item_name, &entry.name);
        fill(&mut self.supplier, &entry.supplier);
        fill(&mut self.unit, &entry.unit);
        fill(&mut self.cf, &format_number(entry.conversion_factor));
    }
}

// =============================================================================
// Pending Submission
// =============================================================================

/// A validated entry waiting in the buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSubmission {
    pub submitted_at: NaiveDateTime,
    pub form_type: FormType,
    pub barcode: String,
    pub item_name: String,
    pub unit: String,
    pub conversion_factor: f64,
    pub quantity: i64,
    pub cost: Money,
    pub selling: Money,
    /// `cost × quantity`, frozen at insertion.
    pub amount: Money,
    /// `(selling - cost) / cost × 100`, or 0 when cost is 0.
    pub gross_profit_pct: f64,
    pub expiry: Option<NaiveDate>,
    pub supplier: String,
    pub remarks: String,
    pub outlet: String,
    pub staff_name: String,
}

impl PendingSubmission {
    /// Validates a draft and computes the derived fields.
    ///
    /// ## Rules
    /// - Barcode, item name and staff name are required
    /// - Unit is required and CF must be a positive number, when collected
    /// - Quantity must be positive
    /// - Cost and selling never fail to parse: garbage reads as 0
    /// - Amount (cost × quantity) must fit the money range
    /// - Damages entries carry no expiry
    pub fn from_draft(
        draft: &SubmissionDraft,
        fields: EntryFieldSet,
        submitted_at: NaiveDateTime,
    ) -> ValidationResult<Self> {
        let barcode = require_text(Column::Barcode.header(), &draft.barcode)?;
        let item_name = require_text(Column::ItemName.header(), &draft.item_name)?;
        let staff_name = require_text(Column::StaffName.header(), &draft.staff_name)?;

        let (unit, conversion_factor) = if fields.unit_and_cf {
            let unit = require_text(Column::Unit.header(), &draft.unit)?;
            (unit, round2(parse_conversion_factor(&draft.cf)?))
        } else {
            (String::new(), 1.0)
        };

        validate_quantity(draft.quantity)?;

        let cost = Money::parse_lenient(&draft.cost);
        let selling = Money::parse_lenient(&draft.selling);
        let amount = cost
            .multiply_quantity(draft.quantity)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: Column::Cost.header().to_string(),
                reason: format!("{} x {} is too large", cost, draft.quantity),
            })?;

        Ok(PendingSubmission {
            submitted_at,
            form_type: draft.form_type,
            barcode,
            item_name,
            unit,
            conversion_factor,
            quantity: draft.quantity,
            cost,
            selling,
            amount,
            gross_profit_pct: Money::gross_profit_pct(cost, selling),
            expiry: draft.expiry.filter(|_| draft.form_type.has_expiry()),
            supplier: draft.supplier.trim().to_string(),
            remarks: draft.remarks.trim().to_string(),
            outlet: draft.outlet.trim().to_string(),
            staff_name,
        })
    }

    /// Flattens the entry into an Items row, columns in sheet order.
    pub fn to_record(&self, fields: EntryFieldSet) -> FlatRecord {
        let mut record = FlatRecord::new()
            .with(
                Column::DateSubmitted.header(),
                self.submitted_at.format(SUBMITTED_AT_FORMAT).to_string(),
            )
            .with(Column::FormType.header(), self.form_type.label())
            .with(Column::Barcode.header(), self.barcode.as_str())
            .with(Column::ItemName.header(), self.item_name.as_str());

        if fields.unit_and_cf {
            record = record
                .with(Column::Unit.header(), self.unit.as_str())
                .with(Column::Cf.header(), format_number(self.conversion_factor));
        }

        let expiry = self
            .expiry
            .map(|d| d.format(EXPIRY_FORMAT).to_string())
            .unwrap_or_default();

        record
            .with(Column::Qty.header(), self.quantity.to_string())
            .with(Column::Cost.header(), self.cost.to_string())
            .with(Column::Selling.header(), self.selling.to_string())
            .with(Column::Amount.header(), self.amount.to_string())
            .with(Column::GpPct.header(), format_number(self.gross_profit_pct))
            .with(Column::Expiry.header(), expiry)
            .with(Column::Supplier.header(), self.supplier.as_str())
            .with(Column::Remarks.header(), self.remarks.as_str())
            .with(Column::Outlet.header(), self.outlet.as_str())
            .with(Column::StaffName.header(), self.staff_name.as_str())
    }
}

// =============================================================================
// Buffer
// =============================================================================

/// Ordered list of pending entries for one session.
#[derive(Debug, Clone, Default)]
pub struct SubmissionBuffer {
    fields: EntryFieldSet,
    entries: Vec<PendingSubmission>,
}

impl SubmissionBuffer {
    /// Creates an empty buffer for a form with the given field set.
    pub fn new(fields: EntryFieldSet) -> Self {
        SubmissionBuffer {
            fields,
            entries: Vec::new(),
        }
    }

    /// The field set entries are validated against.
    pub fn fields(&self) -> EntryFieldSet {
        self.fields
    }

    /// Validates a draft and appends it, stamped with the local time.
    ///
    /// On error the buffer is untouched.
    pub fn add(&mut self, draft: &SubmissionDraft) -> ValidationResult<&PendingSubmission> {
        self.add_at(draft, Local::now().naive_local())
    }

    /// Like [`add`](Self::add) with an explicit timestamp.
    pub fn add_at(
        &mut self,
        draft: &SubmissionDraft,
        submitted_at: NaiveDateTime,
    ) -> ValidationResult<&PendingSubmission> {
        let entry = PendingSubmission::from_draft(draft, self.fields, submitted_at)?;
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Removes the entry at `index` (0-based, display order).
    pub fn remove(&mut self, index: usize) -> CoreResult<PendingSubmission> {
        if index >= self.entries.len() {
            return Err(CoreError::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    /// Pending entries in insertion order.
    pub fn entries(&self) -> &[PendingSubmission] {
        &self.entries
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries flattened for an append batch, in insertion order.
    pub fn records(&self) -> Vec<FlatRecord> {
        self.entries.iter().map(|e| e.to_record(self.fields)).collect()
    }

    /// Drops every entry. Called only after a fully successful append.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
