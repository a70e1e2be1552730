//! # Action Tracking Commands
//!
//! The dashboard over the Items table: filtered listing and `Action Took`
//! updates.
//!
//! ## Set Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shelfline actions set 5=Ordered 9=completed                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  load_tracking(force) ──► edit_action(5, "Ordered")                    │
//! │                           edit_action(9, "Completed")                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  pending_changes ──► commit ──► one batch_update (Q5, Q9)              │
//! │                                                                         │
//! │  Any invalid edit stops the command before the commit.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::Write;

use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use shelfline_core::filter::{distinct_values, submitted_bounds};
use shelfline_core::numeric::format_number;
use shelfline_core::record::EXPIRY_FORMAT;
use shelfline_core::{CellChange, Column, ExpiryWindow, RemoteRow, RowIndex, ViewFilter};
use shelfline_sheets::TabularStore;
use tracing::{debug, info};

use super::{parse_day, Output};
use crate::error::AppResult;
use crate::state::Session;

// =============================================================================
// actions list
// =============================================================================

/// Filters for `actions list`.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Earliest submission date (inclusive)
    #[arg(long, value_parser = parse_day)]
    pub from: Option<NaiveDate>,

    /// Latest submission date (inclusive)
    #[arg(long, value_parser = parse_day)]
    pub to: Option<NaiveDate>,

    /// Expiry window: all, expired, or a number of days
    #[arg(long, default_value = "all")]
    pub expiry: ExpiryWindow,

    /// Exact-match column filter, e.g. --where "Outlet=Marina"
    #[arg(long = "where", value_parser = parse_category)]
    pub categories: Vec<(Column, String)>,

    /// Bypass the read cache
    #[arg(long)]
    pub refresh: bool,
}

impl ListArgs {
    pub fn filter(&self) -> ViewFilter {
        self.categories.iter().fold(
            ViewFilter::new()
                .submitted_between(self.from, self.to)
                .expiring(self.expiry),
            |filter, (column, value)| filter.with_category(*column, value.clone()),
        )
    }
}

fn parse_category(raw: &str) -> Result<(Column, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", raw))?;
    let column: Column = column.parse().map_err(|e: shelfline_core::ValidationError| e.to_string())?;
    Ok((column, value.trim().to_string()))
}

/// `actions list` result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<'a> {
    pub total: usize,
    pub shown: usize,
    pub submitted_range: Option<(NaiveDate, NaiveDate)>,
    pub outlets: Vec<String>,
    pub rows: Vec<&'a RemoteRow>,
}

/// Lists Items rows that pass the filters.
pub async fn list<S: TabularStore, W: Write>(
    session: &mut Session<S>,
    out: &mut Output<W>,
    args: &ListArgs,
    today: NaiveDate,
) -> AppResult<()> {
    debug!(?args, "actions list command");
    session.load_tracking(args.refresh).await?;

    let all = session.working_rows()?;
    let rows = session.filtered_view(&args.filter(), today)?;
    let response = ListResponse {
        total: all.len(),
        shown: rows.len(),
        submitted_range: submitted_bounds(all),
        outlets: distinct_values(all, Column::Outlet),
        rows,
    };

    out.emit(&response, || {
        let mut text = format!(
            "{:>5}  {:<10}  {:<11}  {:<14}  {:<24}  {:>5}  {:<9}  {:<12}  {}\n",
            "Row", "Submitted", "Form", "Barcode", "Item", "Qty", "Expiry", "Outlet", "Action"
        );
        for row in &response.rows {
            let r = &row.record;
            text.push_str(&format!(
                "{:>5}  {:<10}  {:<11}  {:<14}  {:<24}  {:>5}  {:<9}  {:<12}  {}\n",
                row.row_index,
                r.submitted_at
                    .map(|dt| dt.date().to_string())
                    .unwrap_or_default(),
                r.form_type,
                r.barcode,
                truncate(&r.item_name, 24),
                format_number(r.qty),
                r.expiry
                    .map(|d| d.format(EXPIRY_FORMAT).to_string())
                    .unwrap_or_default(),
                truncate(&r.outlet, 12),
                r.action_took
            ));
        }
        text.push_str(&format!(
            "{} of {} rows ({})\n",
            response.shown, response.total, args.expiry
        ));
        text
    })
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

// =============================================================================
// actions set
// =============================================================================

/// Arguments for `actions set`.
#[derive(Debug, Clone, Args)]
pub struct SetArgs {
    /// Row edits as ROW=ACTION, e.g. 5=Ordered
    #[arg(required = true, value_parser = parse_edit)]
    pub edits: Vec<(RowIndex, String)>,
}

fn parse_edit(raw: &str) -> Result<(RowIndex, String), String> {
    let (row, action) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=ACTION, got '{}'", raw))?;
    let row: u32 = row
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a row number", row.trim()))?;
    Ok((RowIndex::new(row), action.to_string()))
}

/// `actions set` result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetReport {
    pub written: usize,
    pub changes: Vec<CellChange>,
}

/// Applies `Action Took` edits and commits them in one batch.
///
/// Always reads the table fresh so row numbers refer to current contents.
/// Edits that leave a cell unchanged are not written.
pub async fn set<S: TabularStore, W: Write>(
    session: &mut Session<S>,
    out: &mut Output<W>,
    args: &SetArgs,
) -> AppResult<()> {
    debug!(edits = args.edits.len(), "actions set command");
    session.load_tracking(true).await?;

    for (row, action) in &args.edits {
        session.edit_action(*row, action)?;
    }

    let changes: Vec<CellChange> = session.pending_changes()?.iter().cloned().collect();
    let written = session.commit().await?;
    if written > 0 {
        info!(written, "Action updates committed");
    }

    let report = SetReport { written, changes };
    out.emit(&report, || {
        let mut text = String::new();
        for change in &report.changes {
            text.push_str(&format!("row {}: {}\n", change.row_index, change.new_value));
        }
        if report.written == 0 {
            text.push_str("Nothing to update\n");
        } else {
            text.push_str(&format!("{} cells updated\n", report.written));
        }
        text
    })
}

/// Prints the configured `Action Took` choices.
pub fn options<S: TabularStore, W: Write>(session: &Session<S>, out: &mut Output<W>) -> AppResult<()> {
    let options = &session.settings().action_options;
    out.emit(options, || options.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::SessionSettings;
    use shelfline_core::Catalog;
    use shelfline_sheets::{MemoryTable, SheetTable};
    use std::sync::Arc;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn items() -> SheetTable<MemoryTable> {
        let header = strings(&["Date Submitted", "Barcode", "Item Name", "Qty", "Expiry", "Outlet", "Action Took"]);
        SheetTable::new(
            "Items",
            MemoryTable::with_rows(vec![
                header,
                strings(&["2025-03-01 10:00:00", "111", "Milk", "2", "04-Mar-25", "Downtown", ""]),
                strings(&["2025-03-02 11:00:00", "222", "Bread", "1", "01-Mar-25", "Marina", "Ordered"]),
                strings(&["2025-03-05 12:00:00", "333", "Juice", "6", "20-Mar-25", "Marina", ""]),
            ]),
        )
    }

    fn session(items: &SheetTable<MemoryTable>) -> Session<MemoryTable> {
        Session::new(
            Arc::new(Catalog::new(Vec::new())),
            items.clone(),
            SheetTable::new("Feedback", MemoryTable::new()),
            SessionSettings::default(),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn json(out: Output<Vec<u8>>) -> serde_json::Value {
        serde_json::from_slice(&out.into_inner()).unwrap()
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            parse_category("outlet = Marina").unwrap(),
            (Column::Outlet, "Marina".to_string())
        );
        assert!(parse_category("Shelf=3").is_err());
        assert_eq!(
            parse_edit("5=Ordered").unwrap(),
            (RowIndex::new(5), "Ordered".to_string())
        );
        assert!(parse_edit("five=Ordered").is_err());
        assert!(parse_edit("5").is_err());
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let items = items();
        let mut session = session(&items);

        let args = ListArgs {
            categories: vec![(Column::Outlet, "Marina".into())],
            ..Default::default()
        };
        let mut out = Output::new(true, Vec::new());
        list(&mut session, &mut out, &args, today()).await.unwrap();
        let value = json(out);
        assert_eq!(value["total"], 3);
        assert_eq!(value["shown"], 2);
        assert_eq!(value["outlets"], serde_json::json!(["Downtown", "Marina"]));

        let args = ListArgs {
            expiry: ExpiryWindow::Expired,
            ..Default::default()
        };
        let mut out = Output::new(false, Vec::new());
        list(&mut session, &mut out, &args, today()).await.unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("Bread"));
        assert!(!text.contains("Juice"));
        assert!(text.ends_with("1 of 3 rows (Already Expired)\n"));
    }

    #[tokio::test]
    async fn test_set_commits_changed_cells_only() {
        let items = items();
        let mut session = session(&items);

        let args = SetArgs {
            edits: vec![
                (RowIndex::new(2), "completed".into()),
                (RowIndex::new(3), "Ordered".into()),
            ],
        };
        let mut out = Output::new(true, Vec::new());
        set(&mut session, &mut out, &args).await.unwrap();

        let value = json(out);
        assert_eq!(value["written"], 1);
        assert_eq!(value["changes"][0]["newValue"], "Completed");

        let rows = items.store().rows();
        assert_eq!(rows[1][6], "Completed");
        assert_eq!(rows[2][6], "Ordered");
    }

    #[tokio::test]
    async fn test_set_rejects_unknown_action() {
        let items = items();
        let mut session = session(&items);

        let args = SetArgs {
            edits: vec![
                (RowIndex::new(2), "Completed".into()),
                (RowIndex::new(4), "Lost".into()),
            ],
        };
        let mut out = Output::new(false, Vec::new());
        let err = set(&mut session, &mut out, &args).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(items.store().write_calls(), 0);
    }
}
