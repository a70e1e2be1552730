//! # Table Handle
//!
//! The [`TabularStore`] seam and the [`SheetTable`] handle every read and
//! write goes through.
//!
//! ## Write Gate & Read Cache
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SheetTable (cheap to clone, clones share gate + cache)                 │
//! │                                                                         │
//! │   read(force)                          write()                          │
//! │      │                                    │                             │
//! │      ├─ cache fresh & !force ─► cached    ▼                             │
//! │      ▼                              gate.write() ─── exclusive          │
//! │   gate.read() ─── shared               │                                │
//! │      │                                 ├─ append_rows / batch_update    │
//! │      ▼                                 ▼                                │
//! │   store.read_all ─► cache          cache invalidated                    │
//! │   (gate held until cached)                                              │
//! │                                                                         │
//! │  A load waits for any in-flight write, so it never sees a              │
//! │  half-written table.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shelfline_core::TableSnapshot;
use tokio::sync::{Mutex, RwLock, RwLockWriteGuard};
use tracing::debug;

use crate::address::CellUpdate;
use crate::error::StoreResult;

/// How long a full-table read is reused before the store is asked again.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

// =============================================================================
// Store Trait
// =============================================================================

/// A single table of text cells, row 1 being the header.
///
/// Rows may be ragged: trailing blank cells are allowed to be missing.
pub trait TabularStore: Send + Sync {
    /// Every row, header included.
    fn read_all(&self) -> impl Future<Output = StoreResult<Vec<Vec<String>>>> + Send;

    /// Appends rows after the last row, in order, as one call.
    ///
    /// Returns the number of rows stored.
    fn append_rows(&self, rows: Vec<Vec<String>>) -> impl Future<Output = StoreResult<usize>> + Send;

    /// Writes individual cells as one call.
    ///
    /// Returns the number of cells written.
    fn batch_update(&self, updates: Vec<CellUpdate>) -> impl Future<Output = StoreResult<usize>> + Send;
}

/// Applies cell updates to an in-memory grid, growing it as needed.
pub(crate) fn apply_updates(rows: &mut Vec<Vec<String>>, updates: &[CellUpdate]) {
    for update in updates {
        let row = update.address.row as usize;
        let column = update.address.column as usize;
        if row == 0 || column == 0 {
            continue;
        }
        if rows.len() < row {
            rows.resize_with(row, Vec::new);
        }
        let cells = &mut rows[row - 1];
        if cells.len() < column {
            cells.resize(column, String::new());
        }
        cells[column - 1] = update.value.clone();
    }
}

// =============================================================================
// Table Handle
// =============================================================================

struct CachedRead {
    fetched_at: Instant,
    rows: Arc<Vec<Vec<String>>>,
}

/// Shared handle to one table.
pub struct SheetTable<S> {
    name: String,
    store: Arc<S>,
    gate: Arc<RwLock<()>>,
    cache: Arc<Mutex<Option<CachedRead>>>,
    ttl: Duration,
}

impl<S> Clone for SheetTable<S> {
    fn clone(&self) -> Self {
        SheetTable {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
            gate: Arc::clone(&self.gate),
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

impl<S: TabularStore> SheetTable<S> {
    /// Wraps a store with the default cache TTL.
    pub fn new(name: impl Into<String>, store: S) -> Self {
        SheetTable {
            name: name.into(),
            store: Arc::new(store),
            gate: Arc::new(RwLock::new(())),
            cache: Arc::new(Mutex::new(None)),
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Sets how long reads are cached. Zero disables caching.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Table name, for logs and messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads every row, header included.
    ///
    /// Served from the cache when it is younger than the TTL, unless
    /// `force` is set.
    pub async fn read(&self, force: bool) -> StoreResult<Arc<Vec<Vec<String>>>> {
        if !force {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    debug!(table = %self.name, rows = cached.rows.len(), "Serving cached read");
                    return Ok(Arc::clone(&cached.rows));
                }
            }
        }

        // The gate stays held until the cache is filled, so a write cannot
        // invalidate in between and leave pre-write rows cached.
        let _gate = self.gate.read().await;
        let rows = Arc::new(self.store.read_all().await?);
        debug!(table = %self.name, rows = rows.len(), force, "Read table from store");

        *self.cache.lock().await = Some(CachedRead {
            fetched_at: Instant::now(),
            rows: Arc::clone(&rows),
        });
        Ok(rows)
    }

    /// Reads the table and loads it as a snapshot.
    pub async fn load_snapshot(&self, force: bool) -> StoreResult<TableSnapshot> {
        let rows = self.read(force).await?;
        let (header, data) = match rows.split_first() {
            Some((header, data)) => (header.as_slice(), data),
            None => (&[][..], &[][..]),
        };
        Ok(TableSnapshot::load(header, data))
    }

    /// Takes the exclusive side of the write gate.
    pub async fn write(&self) -> TableWriteGuard<'_, S> {
        TableWriteGuard {
            _gate: self.gate.write().await,
            table: self,
        }
    }

    /// Drops the cached read.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    /// Whether a read is currently cached.
    pub async fn is_cached(&self) -> bool {
        self.cache.lock().await.is_some()
    }
}

// =============================================================================
// Write Guard
// =============================================================================

/// Exclusive access to a table for the duration of one write operation.
///
/// Every write through the guard invalidates the cached read, whether it
/// succeeded or not: a failed call may still have changed the table.
pub struct TableWriteGuard<'a, S> {
    _gate: RwLockWriteGuard<'a, ()>,
    table: &'a SheetTable<S>,
}

impl<S: TabularStore> TableWriteGuard<'_, S> {
    /// Reads the current rows, bypassing the cache.
    pub async fn read_all(&self) -> StoreResult<Vec<Vec<String>>> {
        self.table.store.read_all().await
    }

    /// Appends rows.
    pub async fn append_rows(&self, rows: Vec<Vec<String>>) -> StoreResult<usize> {
        let result = self.table.store.append_rows(rows).await;
        self.table.invalidate().await;
        result
    }

    /// Writes cells.
    pub async fn batch_update(&self, updates: Vec<CellUpdate>) -> StoreResult<usize> {
        let result = self.table.store.batch_update(updates).await;
        self.table.invalidate().await;
        result
    }
}
