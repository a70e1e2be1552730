//! # Snapshot & Diff Engine
//!
//! Tracks the last-synced state of a table and the user's edits to it, and
//! computes the minimal set of changed cells.
//!
//! ## Reconciliation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  store.read_all() ──► TableSnapshot::load  (row 2, 3, 4, ... assigned)  │
//! │                            │                                            │
//! │                            ▼  working_copy(editable)                    │
//! │                       WorkingCopy ──edit(row 5, Action Took)──┐         │
//! │                            │                                  │         │
//! │                            ▼                                  │         │
//! │        diff(snapshot, working, editable) ──► ChangeSet        │         │
//! │                            │      [{row 5, Action Took, "Completed"}]   │
//! │                            ▼                                            │
//! │               writer.commit_changes ── ok ──► snapshot.acknowledge      │
//! │                                                                         │
//! │  Row identity is the RowIndex, never the position in a Vec: display    │
//! │  filters and sorts never change which physical row an edit targets.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::record::ItemRecord;
use crate::types::{Column, RowIndex};
use crate::FIRST_DATA_ROW;

// =============================================================================
// Schema
// =============================================================================

/// Header → 1-based column position mapping of a loaded table.
///
/// ## Virtual Columns
/// A table created by the item forms has no `Action Took` header. The
/// schema appends it after the physical headers so edits can be addressed;
/// the header cell itself is written together with the first commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    headers: Vec<String>,
    physical_len: usize,
}

impl TableSchema {
    /// Builds a schema from the physical header row.
    pub fn from_header(header: &[String]) -> Self {
        let mut headers: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        let physical_len = headers.len();

        let action = Column::ActionTook.header();
        if !headers.iter().any(|h| h == action) {
            headers.push(action.to_string());
        }

        TableSchema {
            headers,
            physical_len,
        }
    }

    /// All headers, physical first, then virtual.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 1-based column position of a header.
    pub fn position(&self, header: &str) -> Option<u32> {
        self.headers
            .iter()
            .position(|h| h == header)
            .map(|idx| idx as u32 + 1)
    }

    /// Checks if a header exists only in the schema, not yet in the table.
    pub fn is_virtual(&self, header: &str) -> bool {
        self.headers
            .iter()
            .position(|h| h == header)
            .is_some_and(|idx| idx >= self.physical_len)
    }

    /// Number of header cells physically present in row 1.
    pub fn physical_len(&self) -> usize {
        self.physical_len
    }
}

// =============================================================================
// Rows
// =============================================================================

/// One data row of the Items table with its stable row index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRow {
    pub row_index: RowIndex,
    #[serde(flatten)]
    pub record: ItemRecord,
}

impl RemoteRow {
    /// String-normalized value of a column.
    pub fn value(&self, column: Column) -> String {
        self.record.text(column)
    }
}

fn find_row(rows: &[RemoteRow], row_index: RowIndex) -> Option<usize> {
    rows.binary_search_by_key(&row_index, |r| r.row_index).ok()
}

// =============================================================================
// Snapshot
// =============================================================================

/// The last known remote state of a table.
///
/// Only [`acknowledge`](Self::acknowledge) changes it after load, and only
/// with values the store has confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    schema: TableSchema,
    rows: Vec<RemoteRow>,
}

impl TableSnapshot {
    /// Loads a table from its header and data rows (row 1 excluded).
    ///
    /// Row indexes are assigned from [`FIRST_DATA_ROW`] in sheet order.
    /// Fully blank rows get an index but are not kept, so the indexes of
    /// the rows after them still match their physical rows.
    pub fn load(header: &[String], rows: &[Vec<String>]) -> Self {
        let schema = TableSchema::from_header(header);

        let rows = rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(offset, cells)| RemoteRow {
                row_index: RowIndex::new(FIRST_DATA_ROW + offset as u32),
                record: ItemRecord::from_cells(header, cells),
            })
            .collect();

        TableSnapshot { schema, rows }
    }

    /// The table schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Rows in sheet order.
    pub fn rows(&self) -> &[RemoteRow] {
        &self.rows
    }

    /// Looks up a row by index.
    pub fn get(&self, row_index: RowIndex) -> Option<&RemoteRow> {
        find_row(&self.rows, row_index).map(|idx| &self.rows[idx])
    }

    /// Starts a working copy in which only `editable` columns may change.
    pub fn working_copy(&self, editable: &[Column]) -> WorkingCopy {
        WorkingCopy {
            rows: self.rows.clone(),
            editable: editable.to_vec(),
        }
    }

    /// Copies committed values into the snapshot.
    ///
    /// Called after the store confirmed a commit; re-diffing the same
    /// working copy afterwards yields an empty change set.
    pub fn acknowledge(&mut self, changes: &ChangeSet) {
        for change in changes.iter() {
            if let Some(idx) = find_row(&self.rows, change.row_index) {
                self.rows[idx].record.set_text(change.column, &change.new_value);
            }
        }
    }
}

// =============================================================================
// Working Copy
// =============================================================================

/// User-editable copy of a snapshot. Rows can be edited, never added.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingCopy {
    rows: Vec<RemoteRow>,
    editable: Vec<Column>,
}

impl WorkingCopy {
    /// Sets one cell.
    ///
    /// ## Errors
    /// - [`CoreError::ColumnNotEditable`] for display-only columns
    /// - [`CoreError::UnknownRow`] for an index the snapshot never had
    /// - [`CoreError::Validation`] for text a typed column cannot read; the
    ///   cell keeps its value
    pub fn edit(&mut self, row_index: RowIndex, column: Column, value: &str) -> CoreResult<()> {
        if !self.editable.contains(&column) {
            return Err(CoreError::ColumnNotEditable(column.header().to_string()));
        }

        let idx = find_row(&self.rows, row_index).ok_or(CoreError::UnknownRow(row_index))?;
        self.rows[idx].record.try_set_text(column, value)?;
        Ok(())
    }

    /// Rows in sheet order.
    pub fn rows(&self) -> &[RemoteRow] {
        &self.rows
    }

    /// Looks up a row by index.
    pub fn get(&self, row_index: RowIndex) -> Option<&RemoteRow> {
        find_row(&self.rows, row_index).map(|idx| &self.rows[idx])
    }

    /// Columns this copy accepts edits for.
    pub fn editable(&self) -> &[Column] {
        &self.editable
    }
}

// =============================================================================
// Change Set
// =============================================================================

/// One changed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellChange {
    pub row_index: RowIndex,
    pub column: Column,
    pub new_value: String,
}

/// Cell-level differences between a working copy and its snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet(Vec<CellChange>);

impl ChangeSet {
    /// Iterates changes in working-copy order.
    pub fn iter(&self) -> impl Iterator<Item = &CellChange> {
        self.0.iter()
    }

    /// Number of changed cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<CellChange>> for ChangeSet {
    fn from(changes: Vec<CellChange>) -> Self {
        ChangeSet(changes)
    }
}

/// Computes the changed cells of `working` against `snapshot`.
///
/// Only `editable` columns are compared, by their string-normalized value.
/// Working rows whose index is missing from the snapshot are skipped.
pub fn diff(snapshot: &TableSnapshot, working: &WorkingCopy, editable: &[Column]) -> ChangeSet {
    let originals: HashMap<RowIndex, &RemoteRow> =
        snapshot.rows.iter().map(|r| (r.row_index, r)).collect();

    let mut changes = Vec::new();
    for row in &working.rows {
        let Some(original) = originals.get(&row.row_index) else {
            continue;
        };

        for &column in editable {
            let new_value = row.value(column);
            if new_value != original.value(column) {
                changes.push(CellChange {
                    row_index: row.row_index,
                    column,
                    new_value,
                });
            }
        }
    }

    ChangeSet(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDITABLE: [Column; 1] = [Column::ActionTook];

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn header() -> Vec<String> {
        strings(&["Date Submitted", "Barcode", "Qty", "Action Took"])
    }

    fn sample() -> TableSnapshot {
        let rows = vec![
            strings(&["2025-03-01 09:00:00", "111", "1", ""]),
            strings(&["2025-03-01 10:00:00", "222", "2", "Ordered"]),
            strings(&["2025-03-02 09:00:00", "333", "3", ""]),
            strings(&["2025-03-03 09:00:00", "444", "4", "Pending Review"]),
        ];
        TableSnapshot::load(&header(), &rows)
    }

    #[test]
    fn test_row_indexes_start_at_two() {
        let snapshot = sample();
        let indexes: Vec<u32> = snapshot.rows().iter().map(|r| r.row_index.get()).collect();
        assert_eq!(indexes, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_blank_rows_keep_physical_numbering() {
        let rows = vec![
            strings(&["2025-03-01 09:00:00", "111", "1", ""]),
            strings(&["", "", "", ""]),
            strings(&["2025-03-02 09:00:00", "333", "3", ""]),
        ];
        let snapshot = TableSnapshot::load(&header(), &rows);
        assert_eq!(snapshot.rows().len(), 2);
        assert_eq!(snapshot.rows()[1].row_index, RowIndex::new(4));
    }

    #[test]
    fn test_identical_copy_has_no_changes() {
        let snapshot = sample();
        let working = snapshot.working_copy(&EDITABLE);
        assert!(diff(&snapshot, &working, &EDITABLE).is_empty());
    }

    #[test]
    fn test_single_action_edit() {
        let snapshot = sample();
        let mut working = snapshot.working_copy(&EDITABLE);
        working
            .edit(RowIndex::new(5), Column::ActionTook, "Completed")
            .unwrap();

        let changes = diff(&snapshot, &working, &EDITABLE);
        assert_eq!(
            changes,
            ChangeSet::from(vec![CellChange {
                row_index: RowIndex::new(5),
                column: Column::ActionTook,
                new_value: "Completed".to_string(),
            }])
        );
    }

    #[test]
    fn test_non_editable_differences_ignored() {
        let snapshot = sample();
        let mut working = snapshot.working_copy(&EDITABLE);
        working.rows[0].record.set_text(Column::Qty, "99");
        working.rows[1].record.set_text(Column::Barcode, "changed");

        assert!(diff(&snapshot, &working, &EDITABLE).is_empty());
    }

    #[test]
    fn test_edit_rejects_display_columns_and_unknown_rows() {
        let snapshot = sample();
        let mut working = snapshot.working_copy(&EDITABLE);

        assert!(matches!(
            working.edit(RowIndex::new(2), Column::Qty, "5"),
            Err(CoreError::ColumnNotEditable(_))
        ));
        assert!(matches!(
            working.edit(RowIndex::new(40), Column::ActionTook, "Ordered"),
            Err(CoreError::UnknownRow(_))
        ));
    }

    #[test]
    fn test_unreadable_typed_edit_is_rejected() {
        let snapshot = sample();
        let editable = [Column::ActionTook, Column::Qty];
        let mut working = snapshot.working_copy(&editable);

        assert!(matches!(
            working.edit(RowIndex::new(3), Column::Qty, "two"),
            Err(CoreError::Validation(_))
        ));
        assert!(diff(&snapshot, &working, &editable).is_empty());

        working.edit(RowIndex::new(3), Column::Qty, "6").unwrap();
        assert_eq!(diff(&snapshot, &working, &editable).len(), 1);
    }

    #[test]
    fn test_acknowledge_makes_rediff_empty() {
        let mut snapshot = sample();
        let mut working = snapshot.working_copy(&EDITABLE);
        working.edit(RowIndex::new(3), Column::ActionTook, "Completed").unwrap();
        working.edit(RowIndex::new(2), Column::ActionTook, "Ordered").unwrap();

        let changes = diff(&snapshot, &working, &EDITABLE);
        assert_eq!(changes.len(), 2);
        // working-copy order, not edit order
        assert_eq!(changes.iter().next().unwrap().row_index, RowIndex::new(2));

        snapshot.acknowledge(&changes);
        assert!(diff(&snapshot, &working, &EDITABLE).is_empty());
        assert_eq!(
            snapshot.get(RowIndex::new(3)).unwrap().value(Column::ActionTook),
            "Completed"
        );
    }

    #[test]
    fn test_rows_missing_from_snapshot_are_skipped() {
        let snapshot = sample();
        let mut working = snapshot.working_copy(&EDITABLE);
        working.edit(RowIndex::new(4), Column::ActionTook, "Ordered").unwrap();

        // Same table reloaded without the edited row
        let shorter = TableSnapshot::load(
            &header(),
            &[strings(&["2025-03-01 09:00:00", "111", "1", ""])],
        );
        assert!(diff(&shorter, &working, &EDITABLE).is_empty());
    }

    #[test]
    fn test_schema_adds_virtual_action_column() {
        let schema = TableSchema::from_header(&strings(&["Date Submitted", "Barcode"]));
        assert_eq!(schema.position("Action Took"), Some(3));
        assert!(schema.is_virtual("Action Took"));
        assert!(!schema.is_virtual("Barcode"));
        assert_eq!(schema.physical_len(), 2);

        let schema = TableSchema::from_header(&header());
        assert_eq!(schema.position("Action Took"), Some(4));
        assert!(!schema.is_virtual("Action Took"));
    }
}
