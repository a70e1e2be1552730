//! # Catalog File Loading
//!
//! Reads the reference catalog from a CSV or spreadsheet file.
//!
//! ## Expected Columns
//! ```text
//! ┌──────────────┬─────────────┬──────────────┬────────┬──────┐
//! │ Item Bar Code│ Item Name   │ LP Supplier  │ Unit   │ CF   │
//! │ (required)   │ (required)  │ (required)   │ (opt.) │(opt.)│
//! └──────────────┴─────────────┴──────────────┴────────┴──────┘
//! ```
//! Header names are matched after trimming. Other columns are ignored. A
//! missing or unparseable CF reads as 1.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use shelfline_core::numeric::parse_finite;
use shelfline_core::{Catalog, CatalogEntry};
use tracing::info;

use crate::csv_table::parse_rows;
use crate::error::{StoreError, StoreResult};

pub const BARCODE_COLUMN: &str = "Item Bar Code";
pub const NAME_COLUMN: &str = "Item Name";
pub const SUPPLIER_COLUMN: &str = "LP Supplier";
pub const UNIT_COLUMN: &str = "Unit";
pub const CF_COLUMN: &str = "CF";

/// Loads the catalog file at `path`.
///
/// `.csv` files are read as CSV; `.xlsx`, `.xlsm`, `.xls` and `.ods` use
/// the first worksheet.
pub async fn load_catalog(path: &Path) -> StoreResult<Catalog> {
    let owned: PathBuf = path.to_path_buf();
    let entries = tokio::task::spawn_blocking(move || read_catalog_file(&owned))
        .await
        .map_err(|e| StoreError::Workbook(e.to_string()))??;

    info!(path = %path.display(), entries = entries.len(), "Loaded catalog");
    Ok(Catalog::new(entries))
}

/// Reads catalog entries from a file (blocking).
pub fn read_catalog_file(path: &Path) -> StoreResult<Vec<CatalogEntry>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook_rows(path)?,
        _ => parse_rows(&std::fs::read(path)?)?,
    };

    entries_from_rows(&path.display().to_string(), &rows)
}

fn read_workbook_rows(path: &Path) -> StoreResult<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| StoreError::Workbook(format!("{} has no worksheets", path.display())))??;

    Ok(range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default()
}

/// Builds catalog entries from a header row and data rows.
pub fn entries_from_rows(file: &str, rows: &[Vec<String>]) -> StoreResult<Vec<CatalogEntry>> {
    let header: Vec<String> = rows
        .first()
        .map(|r| r.iter().map(|h| h.trim().to_string()).collect())
        .unwrap_or_default();

    let find = |name: &str| header.iter().position(|h| h == name);
    let require = |name: &str| {
        find(name).ok_or_else(|| StoreError::MissingColumn {
            file: file.to_string(),
            column: name.to_string(),
        })
    };

    let barcode = require(BARCODE_COLUMN)?;
    let name = require(NAME_COLUMN)?;
    let supplier = require(SUPPLIER_COLUMN)?;
    let unit = find(UNIT_COLUMN);
    let cf = find(CF_COLUMN);

    Ok(rows
        .iter()
        .skip(1)
        .filter(|row| !cell(row, barcode).is_empty())
        .map(|row| CatalogEntry {
            barcode: cell(row, barcode),
            name: cell(row, name),
            supplier: cell(row, supplier),
            unit: unit.map(|idx| cell(row, idx)).unwrap_or_default(),
            conversion_factor: cf
                .and_then(|idx| parse_finite(&cell(row, idx)))
                .filter(|v| *v > 0.0)
                .unwrap_or(1.0),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_entries_from_rows() {
        let rows = rows(&[
            &[" Item Bar Code ", "Item Name", "LP Supplier", "CF", "Dept"],
            &["6291003.0", "Milk 1L", "Al Rawabi", "12", "Dairy"],
            &["", "Orphan", "Nobody", "1", ""],
            &["777", "Water", "Masafi", "n/a", ""],
        ]);

        let entries = entries_from_rows("catalog.csv", &rows).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].conversion_factor, 12.0);
        assert_eq!(entries[0].unit, "");
        assert_eq!(entries[1].conversion_factor, 1.0);

        let catalog = Catalog::new(entries);
        assert_eq!(catalog.lookup("6291003").unwrap().name, "Milk 1L");
    }

    #[test]
    fn test_missing_required_column() {
        let rows = rows(&[&["Item Bar Code", "Item Name"], &["1", "Bread"]]);
        let err = entries_from_rows("catalog.csv", &rows).unwrap_err();
        assert_eq!(
            err.to_string(),
            "catalog.csv is missing required column 'LP Supplier'"
        );
    }

    #[tokio::test]
    async fn test_load_csv_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        std::fs::write(
            &path,
            "Item Bar Code,Item Name,LP Supplier,Unit,CF\n123,Bread,Modern Bakery,PKT,6\n",
        )
        .unwrap();

        let catalog = load_catalog(&path).await.unwrap();
        let entry = catalog.lookup(" 123 ").unwrap();
        assert_eq!(entry.unit, "PKT");
        assert_eq!(entry.conversion_factor, 6.0);
    }
}
