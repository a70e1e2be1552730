//! # Item Entry Commands
//!
//! Catalog lookup and item form submission.
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  entries.json ──► [draft, draft, ...]                                  │
//! │                        │                                                │
//! │                        ▼  for each draft                                │
//! │               autofill from catalog (blank fields only)                 │
//! │                        │                                                │
//! │                        ▼                                                │
//! │               session.add_entry ── invalid ──► error, nothing written  │
//! │                        │                                                │
//! │                        ▼                                                │
//! │               session.flush ──► one append to Items                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};
use shelfline_core::numeric::format_number;
use shelfline_core::{CatalogEntry, PendingSubmission, SubmissionDraft};
use shelfline_sheets::TabularStore;
use tracing::{debug, info};

use super::Output;
use crate::error::{AppError, AppResult};
use crate::state::Session;

/// `lookup` result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse<'a> {
    pub barcode: String,
    pub found: bool,
    pub entry: Option<&'a CatalogEntry>,
}

/// Looks a barcode up in the catalog.
///
/// A miss is reported, not treated as a failure: staff then type the item
/// details by hand.
pub fn lookup<S: TabularStore, W: Write>(
    session: &Session<S>,
    out: &mut Output<W>,
    barcode: &str,
) -> AppResult<()> {
    debug!(barcode = %barcode, "lookup command");

    let entry = session.lookup(barcode);
    let response = LookupResponse {
        barcode: barcode.trim().to_string(),
        found: entry.is_some(),
        entry,
    };

    out.emit(&response, || match entry {
        Some(e) => format!(
            "{}\n  supplier: {}\n  unit: {}  cf: {}",
            e.name,
            e.supplier,
            if e.unit.is_empty() { "-" } else { e.unit.as_str() },
            format_number(e.conversion_factor)
        ),
        None => format!("{} is not in the catalog", response.barcode),
    })
}

/// Submit input: a single draft or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DraftInput {
    Many(Vec<SubmissionDraft>),
    One(SubmissionDraft),
}

impl DraftInput {
    pub fn into_vec(self) -> Vec<SubmissionDraft> {
        match self {
            DraftInput::Many(drafts) => drafts,
            DraftInput::One(draft) => vec![draft],
        }
    }
}

/// `submit` result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReport {
    pub queued: usize,
    pub written: usize,
    pub unmatched_barcodes: Vec<String>,
    pub entries: Vec<PendingSubmission>,
}

/// Validates every draft, then appends them to Items in one batch.
///
/// Drafts are checked before anything is written: one invalid draft fails
/// the whole command. With `dry_run` nothing is written.
pub async fn submit<S: TabularStore, W: Write>(
    session: &mut Session<S>,
    out: &mut Output<W>,
    input: &str,
    dry_run: bool,
) -> AppResult<()> {
    let drafts: DraftInput = serde_json::from_str(input)?;
    let drafts = drafts.into_vec();
    debug!(count = drafts.len(), dry_run, "submit command");

    let mut unmatched = Vec::new();
    for (n, mut draft) in drafts.into_iter().enumerate() {
        if !session.autofill(&mut draft) {
            unmatched.push(draft.barcode.trim().to_string());
        }
        session
            .add_entry(&draft)
            .map_err(|e| AppError::new(e.code, format!("entry {}: {}", n + 1, e.message)))?;
    }

    let entries = session.pending_entries().to_vec();
    let written = if dry_run { 0 } else { session.flush().await? };

    if written > 0 {
        info!(written, "Submitted entries");
    }

    let report = SubmitReport {
        queued: entries.len(),
        written,
        unmatched_barcodes: unmatched,
        entries,
    };

    out.emit(&report, || {
        let mut text = String::new();
        for (i, e) in report.entries.iter().enumerate() {
            text.push_str(&format!(
                "{:>3}. {} {} x{}  amount {}  GP {}%\n",
                i + 1,
                e.barcode,
                e.item_name,
                e.quantity,
                e.amount,
                format_number(e.gross_profit_pct)
            ));
        }
        if !report.unmatched_barcodes.is_empty() {
            text.push_str(&format!(
                "not in catalog: {}\n",
                report.unmatched_barcodes.join(", ")
            ));
        }
        if dry_run {
            text.push_str(&format!("{} entries valid, nothing written\n", report.queued));
        } else {
            text.push_str(&format!("{} entries submitted\n", report.written));
        }
        text
    })
}
