//! # In-Memory Table
//!
//! A [`TabularStore`] held in process memory. Failures can be injected to
//! exercise the error paths of the writer and the session.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::address::CellUpdate;
use crate::error::{StoreError, StoreResult};
use crate::table::{apply_updates, TabularStore};

/// How the next store calls should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureMode {
    /// Every call, reads included, fails with `ConnectionFailed`.
    Unreachable,
    /// Write calls fail with `WriteFailed` carrying this cause.
    Reject(String),
    /// Appends store only the first `n` rows, then report a partial write.
    /// Batch updates fail outright.
    Partial(usize),
}

/// Table rows in a mutex, plus failure injection.
#[derive(Debug, Default)]
pub struct MemoryTable {
    rows: Mutex<Vec<Vec<String>>>,
    failure: Mutex<Option<FailureMode>>,
    write_calls: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryTable {
    /// An empty table (no header yet).
    pub fn new() -> Self {
        MemoryTable::default()
    }

    /// A table pre-filled with rows, header first.
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        MemoryTable {
            rows: Mutex::new(rows),
            ..MemoryTable::default()
        }
    }

    /// Current rows, header included.
    pub fn rows(&self) -> Vec<Vec<String>> {
        lock(&self.rows).clone()
    }

    /// Replaces the table contents, as another client would.
    pub fn set_rows(&self, rows: Vec<Vec<String>>) {
        *lock(&self.rows) = rows;
    }

    /// Makes subsequent calls fail.
    pub fn fail_with(&self, mode: FailureMode) {
        *lock(&self.failure) = Some(mode);
    }

    /// Stops injecting failures.
    pub fn recover(&self) {
        *lock(&self.failure) = None;
    }

    /// Number of append / batch update calls received.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn failure(&self) -> Option<FailureMode> {
        lock(&self.failure).clone()
    }
}

impl TabularStore for MemoryTable {
    async fn read_all(&self) -> StoreResult<Vec<Vec<String>>> {
        if self.failure() == Some(FailureMode::Unreachable) {
            return Err(StoreError::ConnectionFailed("memory table unreachable".into()));
        }
        Ok(self.rows())
    }

    async fn append_rows(&self, rows: Vec<Vec<String>>) -> StoreResult<usize> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        let total = rows.len();
        match self.failure() {
            Some(FailureMode::Unreachable) => {
                Err(StoreError::ConnectionFailed("memory table unreachable".into()))
            }
            Some(FailureMode::Reject(cause)) => Err(StoreError::write_failed("append_rows", cause)),
            Some(FailureMode::Partial(n)) => {
                let written = n.min(total);
                lock(&self.rows).extend(rows.into_iter().take(written));
                Err(StoreError::PartialWrite { written, total })
            }
            None => {
                lock(&self.rows).extend(rows);
                Ok(total)
            }
        }
    }

    async fn batch_update(&self, updates: Vec<CellUpdate>) -> StoreResult<usize> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        match self.failure() {
            Some(FailureMode::Unreachable) => {
                Err(StoreError::ConnectionFailed("memory table unreachable".into()))
            }
            Some(FailureMode::Reject(cause)) => Err(StoreError::write_failed("batch_update", cause)),
            Some(FailureMode::Partial(_)) => Err(StoreError::write_failed(
                "batch_update",
                "batch rejected after partial processing",
            )),
            None => {
                apply_updates(&mut lock(&self.rows), &updates);
                Ok(updates.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::CellAddress;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_append_and_update() {
        let table = MemoryTable::with_rows(vec![row(&["Barcode", "Qty"])]);

        assert_eq!(table.append_rows(vec![row(&["1", "2"])]).await.unwrap(), 1);
        table
            .batch_update(vec![CellUpdate::new(CellAddress::new(2, 2), "5")])
            .await
            .unwrap();

        assert_eq!(table.rows()[1], row(&["1", "5"]));
        assert_eq!(table.write_calls(), 2);
    }

    #[tokio::test]
    async fn test_partial_append() {
        let table = MemoryTable::new();
        table.fail_with(FailureMode::Partial(1));

        let err = table
            .append_rows(vec![row(&["a"]), row(&["b"]), row(&["c"])])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::PartialWrite {
                written: 1,
                total: 3
            }
        ));
        assert_eq!(table.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_fails_reads() {
        let table = MemoryTable::new();
        table.fail_with(FailureMode::Unreachable);
        assert!(table.read_all().await.unwrap_err().is_connection());

        table.recover();
        assert!(table.read_all().await.is_ok());
    }
}
