//! # Cell Addressing
//!
//! Physical cell coordinates and their A1 rendering.
//!
//! ```text
//! row 1 ──► header      column 1 = A, 26 = Z, 27 = AA, 703 = AAA
//! row 2 ──► first data row
//!
//! CellAddress { row: 5, column: 17 } ──► "Q5"
//! ```

use std::fmt;

/// A 1-based (row, column) cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellAddress {
    pub row: u32,
    pub column: u32,
}

impl CellAddress {
    pub const fn new(row: u32, column: u32) -> Self {
        CellAddress { row, column }
    }

    /// A1 notation, e.g. `Q5`.
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_letters(self.column), self.row)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Column letters for a 1-based column number (bijective base 26).
pub fn column_letters(column: u32) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// One addressed cell write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub address: CellAddress,
    pub value: String,
}

impl CellUpdate {
    pub fn new(address: CellAddress, value: impl Into<String>) -> Self {
        CellUpdate {
            address,
            value: value.into(),
        }
    }
}
