//! # Row-Addressed Writer
//!
//! Turns change sets into addressed cell writes and flat records into
//! header-aligned appends.
//!
//! ## Commit Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ChangeSet [{row 5, Action Took, "Completed"}]                          │
//! │       │                                                                 │
//! │       ▼  schema.position("Action Took") = 17                            │
//! │  CellUpdate { Q5 = "Completed" }  (+ Q1 = "Action Took" if virtual)     │
//! │       │                                                                 │
//! │       ▼  ONE batch_update call under the write gate                     │
//! │  Table ──► cache invalidated ──► caller acknowledges the snapshot      │
//! │                                                                         │
//! │  Append Path                                                            │
//! │  FlatRecord { "Barcode": "A1", ... }                                    │
//! │       │                                                                 │
//! │       ▼  aligned to the table's header by field name                    │
//! │  [header row if table is empty] + data rows ──► ONE append_rows call    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On any error nothing in memory changes: the caller still holds its
//! buffer or working copy and may retry.

use shelfline_core::{ChangeSet, FlatRecord, SubmissionBuffer, TableSchema};
use tracing::{debug, info, warn};

use crate::address::{CellAddress, CellUpdate};
use crate::error::{StoreError, StoreResult};
use crate::table::{SheetTable, TabularStore};

/// Writes against one table.
pub struct RowAddressedWriter<'a, S> {
    table: &'a SheetTable<S>,
}

impl<'a, S: TabularStore> RowAddressedWriter<'a, S> {
    pub fn new(table: &'a SheetTable<S>) -> Self {
        RowAddressedWriter { table }
    }

    // =========================================================================
    // Cell Updates
    // =========================================================================

    /// Writes every change as one batch. Returns the number of data cells
    /// written.
    ///
    /// ## Errors
    /// - `UnknownColumn` if a change targets a column the schema lacks,
    ///   raised before anything is sent
    /// - Whatever the store reports for the batch call
    pub async fn commit_changes(&self, schema: &TableSchema, changes: &ChangeSet) -> StoreResult<usize> {
        if changes.is_empty() {
            debug!(table = %self.table.name(), "No changes to commit");
            return Ok(0);
        }

        let updates = plan_updates(schema, changes)?;
        let header_cells = updates.len() - changes.len();

        let written = {
            let guard = self.table.write().await;
            guard.batch_update(updates).await.inspect_err(|e| {
                warn!(table = %self.table.name(), error = %e, "Batch update failed");
            })?
        };

        info!(
            table = %self.table.name(),
            cells = changes.len(),
            header_cells,
            written,
            "Committed cell changes"
        );
        Ok(changes.len())
    }

    // =========================================================================
    // Appends
    // =========================================================================

    /// Appends records in order as one call. Returns the number of records
    /// stored.
    ///
    /// If the table has no header, the first record's field names become
    /// the header and are written in the same call.
    ///
    /// ## Errors
    /// - `UnknownColumn` if a record has a field the header lacks; nothing
    ///   is written
    /// - `PartialWrite` counts records only, never the header row
    pub async fn append_rows(&self, records: &[FlatRecord]) -> StoreResult<usize> {
        let Some(first) = records.first() else {
            return Ok(0);
        };

        let guard = self.table.write().await;
        let existing = guard.read_all().await?;

        let current_header: Vec<String> = existing
            .first()
            .map(|row| row.iter().map(|h| h.trim().to_string()).collect())
            .unwrap_or_default();
        let has_header = current_header.iter().any(|h| !h.is_empty());

        let header: Vec<String> = if has_header {
            current_header
        } else {
            first.field_names().iter().map(|s| s.to_string()).collect()
        };

        let mut rows = Vec::with_capacity(records.len() + 1);
        if !has_header {
            rows.push(header.clone());
        }
        for record in records {
            rows.push(align_record(&header, record)?);
        }

        let total = records.len();
        match guard.append_rows(rows).await {
            Ok(_) => {
                info!(
                    table = %self.table.name(),
                    rows = total,
                    wrote_header = !has_header,
                    "Appended rows"
                );
                Ok(total)
            }
            Err(StoreError::PartialWrite { written, .. }) => {
                let written = if has_header { written } else { written.saturating_sub(1) };
                warn!(table = %self.table.name(), written, total, "Append only partially stored");
                Err(StoreError::PartialWrite { written, total })
            }
            Err(e) => {
                warn!(table = %self.table.name(), error = %e, "Append failed");
                Err(e)
            }
        }
    }

    /// Appends every buffered entry, clearing the buffer only when all of
    /// them were stored.
    ///
    /// An empty buffer returns `Ok(0)` without touching the table.
    pub async fn flush(&self, buffer: &mut SubmissionBuffer) -> StoreResult<usize> {
        if buffer.is_empty() {
            return Ok(0);
        }

        let stored = self.append_rows(&buffer.records()).await?;
        buffer.clear();
        Ok(stored)
    }
}

/// Maps changes to cell updates, header cells for virtual columns first.
fn plan_updates(schema: &TableSchema, changes: &ChangeSet) -> StoreResult<Vec<CellUpdate>> {
    let mut headers = Vec::new();
    let mut cells = Vec::with_capacity(changes.len());

    for change in changes.iter() {
        let header = change.column.header();
        let column = schema
            .position(header)
            .ok_or_else(|| StoreError::UnknownColumn(header.to_string()))?;

        if schema.is_virtual(header) && !headers.iter().any(|u: &CellUpdate| u.address.column == column) {
            headers.push(CellUpdate::new(CellAddress::new(1, column), header));
        }

        let address = CellAddress::new(change.row_index.get(), column);
        debug!(cell = %address, value = %change.new_value, "Planned cell update");
        cells.push(CellUpdate::new(address, change.new_value.clone()));
    }

    headers.extend(cells);
    Ok(headers)
}

/// Orders a record's values by header, blank where the record has no field.
fn align_record(header: &[String], record: &FlatRecord) -> StoreResult<Vec<String>> {
    if let Some(unknown) = record
        .field_names()
        .into_iter()
        .find(|name| !header.iter().any(|h| h == name))
    {
        return Err(StoreError::UnknownColumn(unknown.to_string()));
    }

    Ok(header
        .iter()
        .map(|h| record.get(h).unwrap_or_default().to_string())
        .collect())
}
