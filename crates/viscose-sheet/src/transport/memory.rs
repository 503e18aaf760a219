use std::sync::{Arc, Mutex, MutexGuard};
use viscose_types::{CellRef, format_score};

use super::{Grid, SheetTransport};
use crate::{Error, Result};

/// A write observed by [`MemorySheet`]
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    pub worksheet: String,
    pub cell: CellRef,
    pub value: f64,
}

#[derive(Debug, Default)]
struct Inner {
    worksheets: Vec<(String, Grid)>,
    writes: Vec<WriteRecord>,
    failing_writes: usize,
    failing_reads: bool,
    listings: usize,
    grid_reads: usize,
}

/// In-memory spreadsheet with a write log and failure injection.
///
/// Clones share the same sheet, so a test can keep a handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a worksheet; new worksheets go last.
    pub fn with_worksheet<R, C>(self, name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.set_worksheet(name, rows);
        self
    }

    pub fn set_worksheet<R, C>(&self, name: &str, rows: R)
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let grid: Grid = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        let mut inner = self.lock();
        match inner.worksheets.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = grid,
            None => inner.worksheets.push((name.to_string(), grid)),
        }
    }

    /// Append a row to an existing worksheet.
    pub fn push_row<C>(&self, worksheet: &str, row: C)
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut inner = self.lock();
        if let Some((_, grid)) = inner.worksheets.iter_mut().find(|(n, _)| n == worksheet) {
            grid.push(row.into_iter().map(Into::into).collect());
        }
    }

    /// Make the next `count` writes fail with a 503.
    pub fn fail_next_writes(&self, count: usize) {
        self.lock().failing_writes = count;
    }

    /// Make listing and reading fail until switched back.
    pub fn set_reads_failing(&self, failing: bool) {
        self.lock().failing_reads = failing;
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    /// Number of `worksheet_names` calls (one per index build)
    pub fn listing_count(&self) -> usize {
        self.lock().listings
    }

    pub fn grid_read_count(&self) -> usize {
        self.lock().grid_reads
    }

    /// Current text of a cell, if the cell exists
    pub fn cell(&self, worksheet: &str, cell: CellRef) -> Option<String> {
        let inner = self.lock();
        let (_, grid) = inner.worksheets.iter().find(|(n, _)| n == worksheet)?;
        grid.get(cell.row as usize)?.get(cell.col as usize).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking test thread must not hide the sheet from the others.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn unavailable() -> Error {
    Error::Status {
        code: 503,
        body: "injected failure".to_string(),
    }
}

impl SheetTransport for MemorySheet {
    fn worksheet_names(&self) -> Result<Vec<String>> {
        let mut inner = self.lock();
        inner.listings += 1;
        if inner.failing_reads {
            return Err(unavailable());
        }
        Ok(inner.worksheets.iter().map(|(n, _)| n.clone()).collect())
    }

    fn read_grid(&self, worksheet: &str) -> Result<Grid> {
        let mut inner = self.lock();
        inner.grid_reads += 1;
        if inner.failing_reads {
            return Err(unavailable());
        }
        inner
            .worksheets
            .iter()
            .find(|(n, _)| n == worksheet)
            .map(|(_, grid)| grid.clone())
            .ok_or_else(|| Error::WorksheetNotFound(worksheet.to_string()))
    }

    fn write_cell(&self, worksheet: &str, cell: CellRef, value: f64) -> Result<()> {
        let mut inner = self.lock();
        if inner.failing_writes > 0 {
            inner.failing_writes -= 1;
            return Err(unavailable());
        }

        let (_, grid) = inner
            .worksheets
            .iter_mut()
            .find(|(n, _)| n == worksheet)
            .ok_or_else(|| Error::WorksheetNotFound(worksheet.to_string()))?;

        let (row, col) = (cell.row as usize, cell.col as usize);
        if grid.len() <= row {
            grid.resize_with(row + 1, Vec::new);
        }
        if grid[row].len() <= col {
            grid[row].resize(col + 1, String::new());
        }
        grid[row][col] = format_score(value);

        inner.writes.push(WriteRecord {
            worksheet: worksheet.to_string(),
            cell,
            value,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let sheet = MemorySheet::new().with_worksheet("Novice", [["Scenario", "Score"], ["Pasu", ""]]);
        let handle = sheet.clone();

        sheet.write_cell("Novice", CellRef::new(1, 1), 120.0).unwrap();

        assert_eq!(handle.writes().len(), 1);
        assert_eq!(handle.cell("Novice", CellRef::new(1, 1)).as_deref(), Some("120"));
    }

    #[test]
    fn test_injected_write_failures_are_consumed() {
        let sheet = MemorySheet::new().with_worksheet("Novice", [["Scenario", "Score"]]);
        sheet.fail_next_writes(1);

        assert!(sheet.write_cell("Novice", CellRef::new(1, 1), 1.0).is_err());
        assert!(sheet.write_cell("Novice", CellRef::new(1, 1), 1.0).is_ok());
        assert_eq!(sheet.writes().len(), 1);
    }
}
