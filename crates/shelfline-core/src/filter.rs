//! # Filter / View Layer
//!
//! Read-only projections of loaded rows for the tracking dashboard.
//!
//! All predicates compose by AND. Filtering never mutates rows and never
//! changes row identity: the returned references still carry their
//! [`RowIndex`](crate::types::RowIndex), so an edit made on a filtered view
//! lands on the right physical row.
//!
//! Rows with a missing or unparseable date never match a date predicate.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::snapshot::RemoteRow;
use crate::types::Column;

// =============================================================================
// Expiry Window
// =============================================================================

/// "Days until expiry" bucket, evaluated against a caller-supplied today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryWindow {
    #[default]
    All,
    /// Expiry strictly before today.
    Expired,
    /// Expiry in `[today, today + n]`, both ends inclusive.
    Within(u32),
}

impl ExpiryWindow {
    /// The dashboard's standard choices, in display order.
    pub const PRESETS: [ExpiryWindow; 5] = [
        ExpiryWindow::All,
        ExpiryWindow::Within(7),
        ExpiryWindow::Within(30),
        ExpiryWindow::Within(60),
        ExpiryWindow::Expired,
    ];

    /// Whether an expiry date falls in this window.
    pub fn contains(&self, expiry: Option<NaiveDate>, today: NaiveDate) -> bool {
        match self {
            ExpiryWindow::All => true,
            ExpiryWindow::Expired => expiry.is_some_and(|d| d < today),
            ExpiryWindow::Within(days) => {
                let Some(expiry) = expiry else {
                    return false;
                };
                let end = today
                    .checked_add_days(Days::new(u64::from(*days)))
                    .unwrap_or(NaiveDate::MAX);
                today <= expiry && expiry <= end
            }
        }
    }
}

impl fmt::Display for ExpiryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryWindow::All => f.write_str("All Items"),
            ExpiryWindow::Expired => f.write_str("Already Expired"),
            ExpiryWindow::Within(days) => write!(f, "Expiring in {} Days", days),
        }
    }
}

/// Accepts `all`, `expired`, or a day count (`7`).
impl FromStr for ExpiryWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "all" => Ok(ExpiryWindow::All),
            "expired" => Ok(ExpiryWindow::Expired),
            other => other
                .parse::<u32>()
                .map(ExpiryWindow::Within)
                .map_err(|_| ValidationError::InvalidFormat {
                    field: "expiry window".to_string(),
                    reason: format!("expected 'all', 'expired' or a day count, got '{}'", s),
                }),
        }
    }
}

// =============================================================================
// View Filter
// =============================================================================

/// A set of predicates over Items rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFilter {
    pub submitted_from: Option<NaiveDate>,
    pub submitted_to: Option<NaiveDate>,
    pub expiry: ExpiryWindow,
    pub categories: Vec<(Column, String)>,
}

impl ViewFilter {
    /// Matches every row.
    pub fn new() -> Self {
        ViewFilter::default()
    }

    /// Restricts `Date Submitted` (date part) to an inclusive range.
    pub fn submitted_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.submitted_from = from;
        self.submitted_to = to;
        self
    }

    /// Restricts `Expiry` to a window.
    pub fn expiring(mut self, window: ExpiryWindow) -> Self {
        self.expiry = window;
        self
    }

    /// Adds an exact-match predicate on a column.
    pub fn with_category(mut self, column: Column, value: impl Into<String>) -> Self {
        self.categories.push((column, value.into()));
        self
    }

    /// Whether a single row passes every predicate.
    pub fn matches(&self, row: &RemoteRow, today: NaiveDate) -> bool {
        if self.submitted_from.is_some() || self.submitted_to.is_some() {
            let Some(submitted) = row.record.submitted_at.map(|dt| dt.date()) else {
                return false;
            };
            if self.submitted_from.is_some_and(|from| submitted < from) {
                return false;
            }
            if self.submitted_to.is_some_and(|to| submitted > to) {
                return false;
            }
        }

        if !self.expiry.contains(row.record.expiry, today) {
            return false;
        }

        self.categories
            .iter()
            .all(|(column, wanted)| row.value(*column) == *wanted)
    }

    /// Rows passing every predicate, in input order.
    pub fn apply<'a>(&self, rows: &'a [RemoteRow], today: NaiveDate) -> Vec<&'a RemoteRow> {
        rows.iter().filter(|row| self.matches(row, today)).collect()
    }
}

// =============================================================================
// Option Helpers
// =============================================================================

/// Sorted distinct non-blank values of a column, for filter option lists.
pub fn distinct_values(rows: &[RemoteRow], column: Column) -> Vec<String> {
    rows.iter()
        .map(|row| row.value(column))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Earliest and latest `Date Submitted` dates, ignoring unparseable cells.
pub fn submitted_bounds(rows: &[RemoteRow]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = rows
        .iter()
        .filter_map(|row| row.record.submitted_at.map(|dt| dt.date()));
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::TableSnapshot;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn snapshot() -> TableSnapshot {
        let header = strings(&["Date Submitted", "Barcode", "Expiry", "Outlet", "Action Took"]);
        let rows = vec![
            strings(&["2025-03-01 09:00:00", "A", "09-Mar-25", "Downtown", ""]),
            strings(&["2025-03-02 09:00:00", "B", "10-Mar-25", "Marina", "Ordered"]),
            strings(&["2025-03-05 09:00:00", "C", "17-Mar-25", "Downtown", "Ordered"]),
            strings(&["2025-03-06 09:00:00", "D", "18-Mar-25", "Downtown", ""]),
            strings(&["garbled", "E", "", "Marina", ""]),
            strings(&["2025-03-08 09:00:00", "F", "someday", "Downtown", ""]),
        ];
        TableSnapshot::load(&header, &rows)
    }

    fn barcodes(rows: Vec<&RemoteRow>) -> Vec<String> {
        rows.into_iter().map(|r| r.record.barcode.clone()).collect()
    }

    #[test]
    fn test_within_seven_days_is_inclusive() {
        let snapshot = snapshot();
        let filter = ViewFilter::new().expiring(ExpiryWindow::Within(7));
        // 10-Mar (today) and 17-Mar (today + 7) are in; 18-Mar and blanks are out
        assert_eq!(barcodes(filter.apply(snapshot.rows(), today())), vec!["B", "C"]);
    }

    #[test]
    fn test_expired_window() {
        let snapshot = snapshot();
        let filter = ViewFilter::new().expiring(ExpiryWindow::Expired);
        assert_eq!(barcodes(filter.apply(snapshot.rows(), today())), vec!["A"]);
    }

    #[test]
    fn test_submitted_range_excludes_unparseable_dates() {
        let snapshot = snapshot();
        let filter = ViewFilter::new().submitted_between(
            NaiveDate::from_ymd_opt(2025, 3, 2),
            NaiveDate::from_ymd_opt(2025, 3, 6),
        );
        assert_eq!(
            barcodes(filter.apply(snapshot.rows(), today())),
            vec!["B", "C", "D"]
        );
    }

    #[test]
    fn test_predicates_compose_with_and() {
        let snapshot = snapshot();
        let filter = ViewFilter::new()
            .with_category(Column::Outlet, "Downtown")
            .with_category(Column::ActionTook, "Ordered")
            .expiring(ExpiryWindow::Within(30));
        assert_eq!(barcodes(filter.apply(snapshot.rows(), today())), vec!["C"]);
    }

    #[test]
    fn test_filter_keeps_row_identity() {
        let snapshot = snapshot();
        let filter = ViewFilter::new().with_category(Column::Outlet, "Marina");
        let indexes: Vec<u32> = filter
            .apply(snapshot.rows(), today())
            .iter()
            .map(|r| r.row_index.get())
            .collect();
        assert_eq!(indexes, vec![3, 6]);
    }

    #[test]
    fn test_option_helpers() {
        let snapshot = snapshot();
        assert_eq!(
            distinct_values(snapshot.rows(), Column::ActionTook),
            vec!["Ordered"]
        );
        assert_eq!(
            submitted_bounds(snapshot.rows()),
            Some((
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()
            ))
        );
    }

    #[test]
    fn test_window_parsing_and_labels() {
        assert_eq!("7".parse::<ExpiryWindow>().unwrap(), ExpiryWindow::Within(7));
        assert_eq!("Expired".parse::<ExpiryWindow>().unwrap(), ExpiryWindow::Expired);
        assert!("soon".parse::<ExpiryWindow>().is_err());
        assert_eq!(ExpiryWindow::Within(30).to_string(), "Expiring in 30 Days");
    }
}
