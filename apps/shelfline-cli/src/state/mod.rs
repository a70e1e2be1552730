//! # State Module
//!
//! Session state for the CLI. One [`Session`] per invocation, built from
//! [`ShelflineConfig`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Assembly                                     │
//! │                                                                         │
//! │  ShelflineConfig                                                        │
//! │       │                                                                 │
//! │       ├── [catalog] path ──► load_catalog ──► Arc<Catalog>             │
//! │       │                       (no path: empty catalog)                  │
//! │       │                                                                 │
//! │       ├── [store] ─────────► SheetTable<CsvTable> "Items"              │
//! │       │                      SheetTable<CsvTable> "Feedback"           │
//! │       │                      (offline = true: no tables)               │
//! │       │                                                                 │
//! │       └── [forms] [tracking] ► SessionSettings                         │
//! │                                                                         │
//! │                       ┌──────────────────────┐                          │
//! │                       │  Session<CsvTable>   │                          │
//! │                       └──────────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;

pub use session::{Session, SessionSettings};

use std::sync::Arc;

use shelfline_core::Catalog;
use shelfline_sheets::{load_catalog, CsvTable, SheetTable};
use tracing::warn;

use crate::config::ShelflineConfig;
use crate::error::AppResult;

/// Loads the configured catalog, or an empty one when none is configured.
pub async fn open_catalog(config: &ShelflineConfig) -> AppResult<Arc<Catalog>> {
    match &config.catalog.path {
        Some(path) => Ok(Arc::new(load_catalog(path).await?)),
        None => {
            warn!("No catalog configured, barcode lookups will not match");
            Ok(Arc::new(Catalog::new(Vec::new())))
        }
    }
}

/// Opens a session over the configured CSV tables.
pub async fn open_session(config: &ShelflineConfig) -> AppResult<Session<CsvTable>> {
    let catalog = open_catalog(config).await?;
    let settings = SessionSettings::from_config(config);

    if config.store.offline {
        return Ok(Session::offline(catalog, settings));
    }

    let ttl = config.store.cache_ttl();
    let items = SheetTable::new("Items", CsvTable::new(&config.store.items_path)).with_cache_ttl(ttl);
    let feedback =
        SheetTable::new("Feedback", CsvTable::new(&config.store.feedback_path)).with_cache_ttl(ttl);

    Ok(Session::new(catalog, items, feedback, settings))
}
