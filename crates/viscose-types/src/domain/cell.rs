use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell within a worksheet.
///
/// Rows and columns are **0-indexed**: `row = 0` is sheet row `1`,
/// `col = 0` is column `A`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1 notation (e.g. `A1`, `BC32`).
    pub fn to_a1(self) -> String {
        format!("{}{}", column_name(self.col), self.row + 1)
    }

    /// Parse an A1-style reference, accepting optional `$` markers.
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }

        let s = s.replace('$', "");
        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or(A1ParseError::MissingRow)?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() {
            return Err(A1ParseError::MissingColumn);
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(A1ParseError::InvalidRow);
        }

        let col = column_index(letters)?;
        let row: u32 = digits.parse().map_err(|_| A1ParseError::InvalidRow)?;
        if row == 0 {
            return Err(A1ParseError::InvalidRow);
        }

        Ok(Self { row: row - 1, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl From<CellRef> for String {
    fn from(cell: CellRef) -> Self {
        cell.to_a1()
    }
}

impl TryFrom<String> for CellRef {
    type Error = A1ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CellRef::from_a1(&value)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum A1ParseError {
    Empty,
    MissingColumn,
    MissingRow,
    InvalidColumn,
    InvalidRow,
}

impl fmt::Display for A1ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            A1ParseError::Empty => "empty A1 reference",
            A1ParseError::MissingColumn => "missing column in A1 reference",
            A1ParseError::MissingRow => "missing row in A1 reference",
            A1ParseError::InvalidColumn => "invalid column in A1 reference",
            A1ParseError::InvalidRow => "invalid row in A1 reference",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for A1ParseError {}

/// Column letters for a 0-based column index (`0 -> A`, `27 -> AB`).
pub fn column_name(col: u32) -> String {
    let mut n = col as u64 + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push(char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

/// 0-based column index for column letters (case-insensitive).
pub fn column_index(letters: &str) -> Result<u32, A1ParseError> {
    if letters.is_empty() {
        return Err(A1ParseError::MissingColumn);
    }
    let mut col: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return Err(A1ParseError::InvalidColumn);
        }
        let v = (b.to_ascii_uppercase() - b'A') as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(v))
            .ok_or(A1ParseError::InvalidColumn)?;
    }
    Ok(col - 1)
}

/// Concrete destination for a personal-best write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteTarget {
    pub worksheet: String,
    pub cell: CellRef,
    /// Header text of the bound score column
    pub header: String,
}

impl fmt::Display for WriteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'!{}", self.worksheet, self.cell)
    }
}
