use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use viscose_types::{CellRef, format_score};

use super::{Grid, SheetTransport};
use crate::{Error, Result};

/// Spreadsheet stored as a directory with one `<worksheet>.csv` per worksheet.
///
/// Worksheet order is file-name order. Writes rewrite the whole CSV through
/// a temp file in the same directory and a rename.
#[derive(Debug, Clone)]
pub struct LocalWorkbook {
    root: PathBuf,
}

impl LocalWorkbook {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Config(format!(
                "local workbook directory does not exist: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `(worksheet, path)` for every CSV in the directory, sorted by name
    fn entries(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file()
                && is_csv(&path)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                entries.push((stem.to_string(), path.clone()));
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn existing_worksheet(&self, worksheet: &str) -> Result<PathBuf> {
        self.entries()?
            .into_iter()
            .find(|(name, _)| name == worksheet)
            .map(|(_, path)| path)
            .ok_or_else(|| Error::WorksheetNotFound(worksheet.to_string()))
    }

    fn write_grid(&self, path: &Path, grid: &Grid) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(tmp.as_file_mut());
            for row in grid {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        tmp.as_file_mut().flush()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn read_csv(path: &Path) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut grid = Vec::new();
    for record in reader.records() {
        grid.push(record?.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

impl SheetTransport for LocalWorkbook {
    fn worksheet_names(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|(name, _)| name).collect())
    }

    fn read_grid(&self, worksheet: &str) -> Result<Grid> {
        read_csv(&self.existing_worksheet(worksheet)?)
    }

    fn write_cell(&self, worksheet: &str, cell: CellRef, value: f64) -> Result<()> {
        let path = self.existing_worksheet(worksheet)?;
        let mut grid = read_csv(&path)?;

        let row = cell.row as usize;
        let col = cell.col as usize;
        if grid.len() <= row {
            grid.resize_with(row + 1, Vec::new);
        }
        let cells = &mut grid[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = format_score(value);

        self.write_grid(&path, &grid)?;
        debug!("Wrote {} to {}!{}", format_score(value), worksheet, cell);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workbook(files: &[(&str, &str)]) -> (TempDir, LocalWorkbook) {
        let temp = TempDir::new().unwrap();
        for (name, body) in files {
            fs::write(temp.path().join(name), body).unwrap();
        }
        let wb = LocalWorkbook::open(temp.path()).unwrap();
        (temp, wb)
    }

    #[test]
    fn test_worksheets_in_file_name_order() {
        let (_temp, wb) = workbook(&[
            ("b_Intermediate.csv", "Scenario\n"),
            ("a_Novice.CSV", "Scenario\n"),
            ("notes.txt", "ignored"),
        ]);
        assert_eq!(wb.worksheet_names().unwrap(), vec!["a_Novice", "b_Intermediate"]);
    }

    #[test]
    fn test_write_cell_keeps_other_cells() {
        let (_temp, wb) = workbook(&[("Novice.csv", "Scenario,High Score\nPasu,100\nGridshot\n")]);

        wb.write_cell("Novice", CellRef::new(2, 1), 98.5).unwrap();
        wb.write_cell("Novice", CellRef::new(1, 1), 120.0).unwrap();

        let grid = wb.read_grid("Novice").unwrap();
        assert_eq!(grid[0], vec!["Scenario", "High Score"]);
        assert_eq!(grid[1], vec!["Pasu", "120"]);
        assert_eq!(grid[2], vec!["Gridshot", "98.5"]);
    }

    #[test]
    fn test_write_grows_grid() {
        let (_temp, wb) = workbook(&[("Novice.csv", "Scenario\n")]);
        wb.write_cell("Novice", CellRef::new(2, 2), 7.0).unwrap();

        let grid = wb.read_grid("Novice").unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[2], vec!["", "", "7"]);
    }

    #[test]
    fn test_missing_worksheet() {
        let (_temp, wb) = workbook(&[]);
        assert!(matches!(
            wb.read_grid("Nope"),
            Err(Error::WorksheetNotFound(_))
        ));
        assert!(wb.write_cell("Nope", CellRef::new(0, 0), 1.0).is_err());
    }
}
