//! # Commands Module
//!
//! One handler per `shelfline` subcommand. Handlers take the open
//! [`Session`](crate::state::Session) and an [`Output`], and never print
//! directly.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (Output, shared parsers)
//! ├── entry.rs     ◄─── lookup, submit
//! ├── tracking.rs  ◄─── actions list, actions set
//! ├── feedback.rs  ◄─── feedback
//! └── config.rs    ◄─── config show, config init
//! ```
//!
//! ## Output Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shelfline lookup 6291003          shelfline --json lookup 6291003     │
//! │  ─────────────────────────          ───────────────────────────────     │
//! │  Milk 1L                            {"barcode":"6291003",              │
//! │    supplier: Al Rawabi               "name":"Milk 1L", ...}            │
//! │    unit: PCS  cf: 12                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod entry;
pub mod feedback;
pub mod tracking;

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;
use shelfline_core::record::parse_date;

use crate::error::{AppError, AppResult};

/// Where command results go.
pub struct Output<W> {
    json: bool,
    writer: W,
}

impl Output<std::io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Output::new(json, std::io::stdout())
    }
}

impl<W: Write> Output<W> {
    pub fn new(json: bool, writer: W) -> Self {
        Output { json, writer }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Writes `value` as JSON, or the text built by `human`.
    pub fn emit<T, F>(&mut self, value: &T, human: F) -> AppResult<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        if self.json {
            serde_json::to_writer_pretty(&mut self.writer, value)?;
            writeln!(self.writer)?;
        } else {
            let text = human();
            if !text.is_empty() {
                writeln!(self.writer, "{}", text.trim_end())?;
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Parses a calendar date argument in any format the sheets use.
pub fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("unrecognised date '{}'", raw))
}

/// Today's date in local time.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Reads a command input file, `-` meaning stdin.
pub async fn read_input(path: &str) -> AppResult<String> {
    if path == "-" {
        return tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin()))
            .await
            .map_err(|e| AppError::internal(e.to_string()))?
            .map_err(AppError::from);
    }
    Ok(tokio::fs::read_to_string(path).await?)
}
