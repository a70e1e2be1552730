//! # Session
//!
//! Everything one user touches while filling forms and working the action
//! dashboard: the shared catalog, the submission buffer, the Items and
//! Feedback tables, and the tracking snapshot with its working copy.
//!
//! ## Tracking Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Action Tracking Cycle                                │
//! │                                                                         │
//! │  load_tracking(force) ──► snapshot ──► working copy (edits reset)      │
//! │                                            │                            │
//! │                              edit_action(row, "Ordered")               │
//! │                                            │                            │
//! │  pending_changes() ◄──── diff(snapshot, working copy, editable)        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commit() ──► one batch_update ──► snapshot.acknowledge(changes)       │
//! │                    │                                                    │
//! │                    └─ failure: snapshot and working copy untouched     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A session opened with [`Session::offline`] has no tables. Catalog lookups
//! and buffering still work; any call that needs a table fails with
//! `StoreError::ConnectionFailed`.

use std::sync::Arc;

use chrono::NaiveDate;
use shelfline_core::validation::validate_choice;
use shelfline_core::{
    diff, Catalog, CatalogEntry, ChangeSet, Column, CoreError, EntryFieldSet, FeedbackDraft,
    FeedbackEntry, PendingSubmission, RemoteRow, RowIndex, SubmissionBuffer, SubmissionDraft,
    TableSnapshot, ValidationError, ViewFilter, WorkingCopy,
};
use shelfline_sheets::{RowAddressedWriter, SheetTable, StoreError, StoreResult, TabularStore};
use tracing::{debug, info, info_span, Instrument, Span};
use uuid::Uuid;

use crate::config::ShelflineConfig;
use crate::error::AppResult;

/// Session behavior taken from configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub fields: EntryFieldSet,
    pub editable_columns: Vec<Column>,
    pub action_options: Vec<String>,
    /// Allowed outlets. Empty accepts any.
    pub outlets: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings::from_config(&ShelflineConfig::default())
    }
}

impl SessionSettings {
    pub fn from_config(config: &ShelflineConfig) -> Self {
        SessionSettings {
            fields: config.forms.field_set(),
            editable_columns: config.tracking.editable_columns.clone(),
            action_options: config.tracking.action_options.clone(),
            outlets: config.forms.outlets.clone(),
        }
    }
}

/// One user's working context.
pub struct Session<S> {
    id: Uuid,
    span: Span,
    catalog: Arc<Catalog>,
    buffer: SubmissionBuffer,
    items: Option<SheetTable<S>>,
    feedback: Option<SheetTable<S>>,
    snapshot: Option<TableSnapshot>,
    working: Option<WorkingCopy>,
    settings: SessionSettings,
    recent_feedback: Vec<FeedbackEntry>,
}

fn require_table<S>(slot: &Option<SheetTable<S>>) -> StoreResult<&SheetTable<S>> {
    slot.as_ref()
        .ok_or_else(|| StoreError::ConnectionFailed("session is offline".to_string()))
}

impl<S: TabularStore> Session<S> {
    /// Opens a session against the Items and Feedback tables.
    pub fn new(
        catalog: Arc<Catalog>,
        items: SheetTable<S>,
        feedback: SheetTable<S>,
        settings: SessionSettings,
    ) -> Self {
        Self::build(catalog, Some(items), Some(feedback), settings)
    }

    /// Opens a session with no store behind it.
    pub fn offline(catalog: Arc<Catalog>, settings: SessionSettings) -> Self {
        Self::build(catalog, None, None, settings)
    }

    fn build(
        catalog: Arc<Catalog>,
        items: Option<SheetTable<S>>,
        feedback: Option<SheetTable<S>>,
        settings: SessionSettings,
    ) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!("session", id = %id, offline = items.is_none());
        span.in_scope(|| debug!(catalog_entries = catalog.len(), "Session opened"));

        Session {
            id,
            span,
            catalog,
            buffer: SubmissionBuffer::new(settings.fields),
            items,
            feedback,
            snapshot: None,
            working: None,
            settings,
            recent_feedback: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_offline(&self) -> bool {
        self.items.is_none()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    fn check_outlet(&self, outlet: &str) -> Result<String, ValidationError> {
        if outlet.trim().is_empty() || self.settings.outlets.is_empty() {
            return Ok(outlet.trim().to_string());
        }
        validate_choice(Column::Outlet.header(), outlet, &self.settings.outlets)
    }

    // =========================================================================
    // Item Forms
    // =========================================================================

    /// Catalog lookup. A miss is `None`, never an error.
    pub fn lookup(&self, barcode: &str) -> Option<&CatalogEntry> {
        self.catalog.lookup(barcode)
    }

    /// Fills blank fields of `draft` from the catalog. Returns whether the
    /// barcode was found.
    pub fn autofill(&self, draft: &mut SubmissionDraft) -> bool {
        match self.catalog.lookup(&draft.barcode) {
            Some(entry) => {
                draft.apply_catalog(entry);
                true
            }
            None => false,
        }
    }

    /// Validates a draft and queues it.
    pub fn add_entry(&mut self, draft: &SubmissionDraft) -> AppResult<&PendingSubmission> {
        let mut draft = draft.clone();
        draft.outlet = self.check_outlet(&draft.outlet)?;

        let entry = self.buffer.add(&draft)?;
        self.span.in_scope(|| {
            debug!(barcode = %entry.barcode, quantity = entry.quantity, "Entry queued")
        });
        Ok(entry)
    }

    /// Drops a queued entry by position.
    pub fn remove_entry(&mut self, index: usize) -> AppResult<PendingSubmission> {
        Ok(self.buffer.remove(index)?)
    }

    pub fn pending_entries(&self) -> &[PendingSubmission] {
        self.buffer.entries()
    }

    /// Appends every queued entry to Items in one batch.
    ///
    /// An empty buffer returns 0 without reaching for the store, offline or
    /// not. On any failure the buffer is left as it was.
    pub async fn flush(&mut self) -> AppResult<usize> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        let table = require_table(&self.items)?;
        let written = RowAddressedWriter::new(table)
            .flush(&mut self.buffer)
            .instrument(self.span.clone())
            .await?;
        Ok(written)
    }

    // =========================================================================
    // Action Tracking
    // =========================================================================

    /// Loads the Items table and starts a fresh working copy.
    ///
    /// Uncommitted edits are discarded. `force` bypasses the read cache.
    pub async fn load_tracking(&mut self, force: bool) -> AppResult<&TableSnapshot> {
        let table = require_table(&self.items)?;
        let snapshot = table
            .load_snapshot(force)
            .instrument(self.span.clone())
            .await?;

        self.span
            .in_scope(|| info!(rows = snapshot.rows().len(), force, "Tracking table loaded"));

        self.working = Some(snapshot.working_copy(&self.settings.editable_columns));
        Ok(&*self.snapshot.insert(snapshot))
    }

    pub fn snapshot(&self) -> Option<&TableSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn working_rows(&self) -> AppResult<&[RemoteRow]> {
        Ok(self.working.as_ref().ok_or(CoreError::NoSnapshot)?.rows())
    }

    /// Edits one cell of the working copy.
    ///
    /// `Action Took` only accepts the configured options; the stored value
    /// is the option's canonical spelling.
    pub fn edit(&mut self, row: RowIndex, column: Column, value: &str) -> AppResult<()> {
        let value = if column == Column::ActionTook {
            validate_choice(column.header(), value, &self.settings.action_options)?
        } else {
            value.trim().to_string()
        };

        let working = self.working.as_mut().ok_or(CoreError::NoSnapshot)?;
        working.edit(row, column, &value)?;
        Ok(())
    }

    /// Sets the `Action Took` cell of a row.
    pub fn edit_action(&mut self, row: RowIndex, action: &str) -> AppResult<()> {
        self.edit(row, Column::ActionTook, action)
    }

    /// Cells that differ between the working copy and the snapshot.
    pub fn pending_changes(&self) -> AppResult<ChangeSet> {
        let snapshot = self.snapshot.as_ref().ok_or(CoreError::NoSnapshot)?;
        let working = self.working.as_ref().ok_or(CoreError::NoSnapshot)?;
        Ok(diff(snapshot, working, &self.settings.editable_columns))
    }

    /// Writes pending edits in one batch and folds them into the snapshot.
    pub async fn commit(&mut self) -> AppResult<usize> {
        let changes = self.pending_changes()?;
        if changes.is_empty() {
            return Ok(0);
        }

        let table = require_table(&self.items)?;
        let snapshot = self.snapshot.as_mut().ok_or(CoreError::NoSnapshot)?;

        let written = RowAddressedWriter::new(table)
            .commit_changes(snapshot.schema(), &changes)
            .instrument(self.span.clone())
            .await?;
        snapshot.acknowledge(&changes);

        Ok(written)
    }

    /// Throws away uncommitted edits.
    pub fn discard_edits(&mut self) -> AppResult<()> {
        let snapshot = self.snapshot.as_ref().ok_or(CoreError::NoSnapshot)?;
        self.working = Some(snapshot.working_copy(&self.settings.editable_columns));
        Ok(())
    }

    /// Working-copy rows passing `filter`, in sheet order.
    pub fn filtered_view(&self, filter: &ViewFilter, today: NaiveDate) -> AppResult<Vec<&RemoteRow>> {
        Ok(filter.apply(self.working_rows()?, today))
    }

    // =========================================================================
    // Feedback
    // =========================================================================

    /// Validates and appends one feedback row.
    pub async fn submit_feedback(&mut self, draft: &FeedbackDraft) -> AppResult<&FeedbackEntry> {
        let mut draft = draft.clone();
        draft.outlet = self.check_outlet(&draft.outlet)?;
        let entry = FeedbackEntry::from_draft(&draft)?;

        let table = require_table(&self.feedback)?;
        RowAddressedWriter::new(table)
            .append_rows(&[entry.to_record()])
            .instrument(self.span.clone())
            .await?;

        self.span
            .in_scope(|| info!(rating = entry.rating, outlet = %entry.outlet, "Feedback submitted"));
        self.recent_feedback.push(entry);
        Ok(&self.recent_feedback[self.recent_feedback.len() - 1])
    }

    /// Feedback submitted in this session, newest first.
    pub fn recent_feedback(&self) -> impl Iterator<Item = &FeedbackEntry> {
        self.recent_feedback.iter().rev()
    }

    pub fn clear_feedback(&mut self) {
        self.recent_feedback.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::NaiveDate;
    use shelfline_core::{CatalogEntry, ExpiryWindow, FormType};
    use shelfline_sheets::{FailureMode, MemoryTable};

    const HEADER: [&str; 16] = [
        "Date Submitted",
        "Form Type",
        "Barcode",
        "Item Name",
        "Unit",
        "CF",
        "Qty",
        "Cost",
        "Selling",
        "Amount",
        "GP%",
        "Expiry",
        "Supplier",
        "Remarks",
        "Outlet",
        "Staff Name",
    ];

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn item_row(submitted: &str, barcode: &str, expiry: &str, outlet: &str) -> Vec<String> {
        row(&[
            submitted, "Expiry", barcode, "Milk 1L", "PCS", "1", "3", "2.00", "3.00", "6.00",
            "50", expiry, "Al Rawabi", "", outlet, "Sara",
        ])
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(vec![CatalogEntry {
            barcode: "6291003".into(),
            name: "Milk 1L".into(),
            supplier: "Al Rawabi".into(),
            unit: "PCS".into(),
            conversion_factor: 12.0,
        }]))
    }

    type Table = SheetTable<MemoryTable>;

    fn table(name: &str, store: MemoryTable) -> Table {
        SheetTable::new(name, store)
    }

    fn session_with(items: &Table, feedback: &Table, settings: SessionSettings) -> Session<MemoryTable> {
        Session::new(catalog(), items.clone(), feedback.clone(), settings)
    }

    fn empty(name: &str) -> Table {
        table(name, MemoryTable::new())
    }

    fn seeded_items() -> Table {
        table("Items", MemoryTable::with_rows(vec![
            row(&HEADER),
            item_row("2025-03-01 09:00:00", "111", "05-Mar-25", "Downtown"),
            item_row("2025-03-02 09:00:00", "222", "30-Apr-25", "Marina"),
        ]))
    }

    fn draft() -> SubmissionDraft {
        SubmissionDraft {
            form_type: FormType::Expiry,
            barcode: "6291003".into(),
            quantity: 2,
            cost: "2".into(),
            selling: "3".into(),
            staff_name: "Sara".into(),
            outlet: "downtown".into(),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[tokio::test]
    async fn test_autofill_add_and_flush() {
        let items = empty("Items");
        let settings = SessionSettings {
            outlets: vec!["Downtown".into(), "Marina".into()],
            ..Default::default()
        };
        let mut session = session_with(&items, &empty("Feedback"), settings);

        let mut draft = draft();
        assert!(session.autofill(&mut draft));
        assert_eq!(draft.cf, "12");

        let entry = session.add_entry(&draft).unwrap();
        assert_eq!(entry.outlet, "Downtown");
        assert_eq!(entry.amount.cents(), 400);

        assert_eq!(session.flush().await.unwrap(), 1);
        assert!(session.pending_entries().is_empty());

        let stored = items.store().rows();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0][0], "Date Submitted");
        assert_eq!(stored[1][3], "Milk 1L");
    }

    #[tokio::test]
    async fn test_unknown_outlet_rejected() {
        let settings = SessionSettings {
            outlets: vec!["Downtown".into()],
            ..Default::default()
        };
        let mut session = session_with(&empty("Items"), &empty("Feedback"), settings);

        let mut draft = draft();
        session.autofill(&mut draft);
        draft.outlet = "Airport".into();

        let err = session.add_entry(&draft).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(session.pending_entries().is_empty());
    }

    #[tokio::test]
    async fn test_offline_session() {
        let mut session: Session<MemoryTable> =
            Session::offline(catalog(), SessionSettings::default());
        assert!(session.is_offline());
        assert_eq!(session.lookup(" 6291003.0 ").unwrap().name, "Milk 1L");

        // Empty flush never reaches for the store
        assert_eq!(session.flush().await.unwrap(), 0);

        let mut draft = draft();
        session.autofill(&mut draft);
        session.add_entry(&draft).unwrap();

        let err = session.flush().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConnectionError);
        assert_eq!(session.pending_entries().len(), 1);

        let err = session.remove_entry(4).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(session.remove_entry(0).unwrap().barcode, "6291003");
        session.add_entry(&draft).unwrap();

        let err = session.load_tracking(false).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConnectionError);

        let feedback = FeedbackDraft {
            customer_name: "Omar".into(),
            feedback: "Great service".into(),
            ..Default::default()
        };
        let err = session.submit_feedback(&feedback).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConnectionError);
        assert_eq!(session.recent_feedback().count(), 0);
    }

    #[tokio::test]
    async fn test_flush_failure_keeps_buffer() {
        let items = empty("Items");
        let mut session = session_with(&items, &empty("Feedback"), SessionSettings::default());

        let mut draft = draft();
        session.autofill(&mut draft);
        session.add_entry(&draft).unwrap();
        session.add_entry(&draft).unwrap();

        items.store().fail_with(FailureMode::Partial(1));
        let err = session.flush().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::WriteError);
        assert_eq!(session.pending_entries().len(), 2);
    }

    #[tokio::test]
    async fn test_tracking_edit_commit_cycle() {
        let items = seeded_items();
        let mut session = session_with(&items, &empty("Feedback"), SessionSettings::default());

        assert!(session.edit_action(RowIndex::new(2), "Ordered").is_err());

        let snapshot = session.load_tracking(false).await.unwrap();
        assert_eq!(snapshot.rows().len(), 2);
        assert!(snapshot.schema().is_virtual("Action Took"));

        session.edit_action(RowIndex::new(3), "ordered").unwrap();
        let changes = session.pending_changes().unwrap();
        assert_eq!(changes.len(), 1);

        assert_eq!(session.commit().await.unwrap(), 1);
        assert!(session.pending_changes().unwrap().is_empty());

        let stored = items.store().rows();
        assert_eq!(stored[0][16], "Action Took");
        assert_eq!(stored[2][16], "Ordered");

        // Nothing left to write
        assert_eq!(session.commit().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_edit_validation() {
        let mut session =
            session_with(&seeded_items(), &empty("Feedback"), SessionSettings::default());
        session.load_tracking(false).await.unwrap();

        let err = session.edit_action(RowIndex::new(2), "Shipped").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = session.edit_action(RowIndex::new(9), "Ordered").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = session
            .edit(RowIndex::new(2), Column::Barcode, "999")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unreadable_expiry_edit_leaves_cell_alone() {
        let items = seeded_items();
        let settings = SessionSettings {
            editable_columns: vec![Column::ActionTook, Column::Expiry],
            ..Default::default()
        };
        let mut session = session_with(&items, &empty("Feedback"), settings);
        session.load_tracking(false).await.unwrap();

        let err = session
            .edit(RowIndex::new(2), Column::Expiry, "31/02/2025")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(session.pending_changes().unwrap().is_empty());
        assert_eq!(session.commit().await.unwrap(), 0);
        assert_eq!(items.store().rows()[1][11], "05-Mar-25");

        session
            .edit(RowIndex::new(2), Column::Expiry, "2025-03-20")
            .unwrap();
        assert_eq!(session.commit().await.unwrap(), 1);
        assert_eq!(items.store().rows()[1][11], "20-Mar-25");
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_edits() {
        let items = seeded_items();
        let mut session = session_with(&items, &empty("Feedback"), SessionSettings::default());
        session.load_tracking(false).await.unwrap();
        session.edit_action(RowIndex::new(2), "Completed").unwrap();

        items.store().fail_with(FailureMode::Reject("quota exceeded".into()));
        assert!(session.commit().await.is_err());
        assert_eq!(session.pending_changes().unwrap().len(), 1);

        items.store().recover();
        assert_eq!(session.commit().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_discard_and_reload_reset_edits() {
        let items = seeded_items();
        let mut session = session_with(&items, &empty("Feedback"), SessionSettings::default());
        session.load_tracking(false).await.unwrap();

        session.edit_action(RowIndex::new(2), "Ordered").unwrap();
        session.discard_edits().unwrap();
        assert!(session.pending_changes().unwrap().is_empty());

        session.edit_action(RowIndex::new(2), "Ordered").unwrap();
        session.load_tracking(true).await.unwrap();
        assert!(session.pending_changes().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filtered_view_uses_working_copy() {
        let mut session =
            session_with(&seeded_items(), &empty("Feedback"), SessionSettings::default());
        session.load_tracking(false).await.unwrap();
        session.edit_action(RowIndex::new(2), "Completed").unwrap();

        let expiring = ViewFilter::new().expiring(ExpiryWindow::Within(7));
        let rows = session.filtered_view(&expiring, today()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_index, RowIndex::new(2));
        assert_eq!(rows[0].value(Column::ActionTook), "Completed");

        let marina = ViewFilter::new().with_category(Column::Outlet, "Marina");
        let rows = session.filtered_view(&marina, today()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_index, RowIndex::new(3));
    }

    #[tokio::test]
    async fn test_feedback_log() {
        let feedback_table = empty("Feedback");
        let mut session = session_with(&empty("Items"), &feedback_table, SessionSettings::default());

        for name in ["Omar", "Lina"] {
            let draft = FeedbackDraft {
                customer_name: name.into(),
                feedback: "Clean aisles".into(),
                rating: 4,
                ..Default::default()
            };
            let entry = session.submit_feedback(&draft).await.unwrap();
            assert_eq!(entry.contact, "N/A");
        }

        let names: Vec<_> = session
            .recent_feedback()
            .map(|e| e.customer_name.as_str())
            .collect();
        assert_eq!(names, vec!["Lina", "Omar"]);

        let stored = feedback_table.store().rows();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0][0], "Customer Name");
        assert_eq!(stored[1][2], "4 / 5");

        session.clear_feedback();
        assert_eq!(session.recent_feedback().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_feedback_not_written() {
        let feedback_table = empty("Feedback");
        let mut session = session_with(&empty("Items"), &feedback_table, SessionSettings::default());

        let draft = FeedbackDraft {
            customer_name: "Omar".into(),
            rating: 9,
            feedback: "ok".into(),
            ..Default::default()
        };
        assert!(session.submit_feedback(&draft).await.is_err());
        assert_eq!(feedback_table.store().write_calls(), 0);
    }
}
