//! # Catalog Module
//!
//! In-memory barcode lookup over the reference catalog.
//!
//! The catalog is loaded once (see `shelfline_sheets::catalog_source`) and
//! never changes afterwards, so each lookup is a plain hash map read.

use std::collections::HashMap;

use crate::types::CatalogEntry;

/// Normalizes a barcode for comparison.
///
/// Trims whitespace and strips a trailing `.0` from an all-digit value, the
/// artifact of a spreadsheet exporting a barcode column as floats.
///
/// ```rust
/// use shelfline_core::catalog::normalize_barcode;
///
/// assert_eq!(normalize_barcode(" 6291003 "), "6291003");
/// assert_eq!(normalize_barcode("6291003.0"), "6291003");
/// assert_eq!(normalize_barcode("A1.0"), "A1.0");
/// ```
pub fn normalize_barcode(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(".0") {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// The reference catalog, keyed by normalized barcode.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_barcode: HashMap<String, usize>,
}

impl Catalog {
    /// Builds the catalog. Barcodes are normalized; on duplicates the first
    /// entry wins. Entries with a blank barcode are kept but unreachable.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut by_barcode = HashMap::with_capacity(entries.len());
        let entries: Vec<CatalogEntry> = entries
            .into_iter()
            .map(|mut entry| {
                entry.barcode = normalize_barcode(&entry.barcode);
                entry
            })
            .collect();

        for (idx, entry) in entries.iter().enumerate() {
            if !entry.barcode.is_empty() {
                by_barcode.entry(entry.barcode.clone()).or_insert(idx);
            }
        }

        Catalog {
            entries,
            by_barcode,
        }
    }

    /// Looks up a scanned or typed barcode.
    ///
    /// `None` means "not in the catalog": the caller fills every field by
    /// hand. It is never an error.
    pub fn lookup(&self, barcode: &str) -> Option<&CatalogEntry> {
        let key = normalize_barcode(barcode);
        self.by_barcode.get(&key).map(|&idx| &self.entries[idx])
    }

    /// Number of loaded entries (duplicates included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
