//! # CSV File Table
//!
//! A [`TabularStore`] backed by one CSV file.
//!
//! ```text
//! items.csv
//! ┌──────────────────────────────────────────────────────────┐
//! │ Date Submitted,Form Type,Barcode,...,Action Took         │  row 1
//! │ 2025-03-01 09:12:00,Expiry,6291003,...,Pending Review    │  row 2
//! │ ...                                                      │
//! └──────────────────────────────────────────────────────────┘
//!
//! read_all      ─► whole file parsed (missing file = empty table)
//! append_rows   ─► records appended to the end of the file
//! batch_update  ─► file rewritten through a temp file + rename
//! ```
//!
//! A missing parent directory means the configured location is wrong, which
//! is reported as a connection failure rather than silently creating it.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::address::CellUpdate;
use crate::error::{StoreError, StoreResult};
use crate::table::{apply_updates, TabularStore};

/// A table stored as a CSV file.
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
}

impl CsvTable {
    /// Points at a CSV file. The file itself may not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvTable { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    async fn ensure_reachable(&self) -> StoreResult<()> {
        let dir = self.parent_dir();
        match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(StoreError::ConnectionFailed(format!(
                "directory {} does not exist",
                dir.display()
            ))),
        }
    }
}

/// Parses CSV bytes into ragged rows (no header interpretation).
pub(crate) fn parse_rows(bytes: &[u8]) -> StoreResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn encode_rows(rows: &[Vec<String>]) -> StoreResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| StoreError::Io(e.into_error()))
}

fn replace_file(dir: &Path, path: &Path, contents: &[u8]) -> StoreResult<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| StoreError::write_failed("batch_update", e.error))?;
    Ok(())
}

impl TabularStore for CsvTable {
    async fn read_all(&self) -> StoreResult<Vec<Vec<String>>> {
        self.ensure_reachable().await?;

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let rows = parse_rows(&bytes)?;
        debug!(path = %self.path.display(), rows = rows.len(), "Parsed CSV table");
        Ok(rows)
    }

    async fn append_rows(&self, rows: Vec<Vec<String>>) -> StoreResult<usize> {
        self.ensure_reachable().await?;

        let mut contents = encode_rows(&rows)?;

        // A file edited by hand may lack the final newline
        if let Ok(existing) = tokio::fs::read(&self.path).await {
            if existing.last().is_some_and(|b| *b != b'\n') {
                contents.insert(0, b'\n');
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::write_failed("append_rows", e))?;
        file.write_all(&contents)
            .await
            .map_err(|e| StoreError::write_failed("append_rows", e))?;
        file.flush()
            .await
            .map_err(|e| StoreError::write_failed("append_rows", e))?;

        Ok(rows.len())
    }

    async fn batch_update(&self, updates: Vec<CellUpdate>) -> StoreResult<usize> {
        let mut rows = self.read_all().await?;
        apply_updates(&mut rows, &updates);
        let contents = encode_rows(&rows)?;

        let dir = self.parent_dir().to_path_buf();
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&dir, &path, &contents))
            .await
            .map_err(|e| StoreError::write_failed("batch_update", e))??;

        Ok(updates.len())
    }
}
