mod google;
mod local;
mod memory;

pub use google::GoogleSheetsTransport;
pub use local::LocalWorkbook;
pub use memory::{MemorySheet, WriteRecord};

use viscose_types::CellRef;

use crate::Result;

/// Row-major cell text of a worksheet. Rows may be ragged.
pub type Grid = Vec<Vec<String>>;

/// Read and write access to a remote spreadsheet.
///
/// Implementations are used from a single thread; `write_cell` takes `&self`
/// so a transport can be shared between the index loader and the writer.
pub trait SheetTransport {
    /// Worksheet titles in spreadsheet order
    fn worksheet_names(&self) -> Result<Vec<String>>;

    fn read_grid(&self, worksheet: &str) -> Result<Grid>;

    fn write_cell(&self, worksheet: &str, cell: CellRef, value: f64) -> Result<()>;
}

impl<T: SheetTransport + ?Sized> SheetTransport for &T {
    fn worksheet_names(&self) -> Result<Vec<String>> {
        (**self).worksheet_names()
    }

    fn read_grid(&self, worksheet: &str) -> Result<Grid> {
        (**self).read_grid(worksheet)
    }

    fn write_cell(&self, worksheet: &str, cell: CellRef, value: f64) -> Result<()> {
        (**self).write_cell(worksheet, cell, value)
    }
}

impl<T: SheetTransport + ?Sized> SheetTransport for Box<T> {
    fn worksheet_names(&self) -> Result<Vec<String>> {
        (**self).worksheet_names()
    }

    fn read_grid(&self, worksheet: &str) -> Result<Grid> {
        (**self).read_grid(worksheet)
    }

    fn write_cell(&self, worksheet: &str, cell: CellRef, value: f64) -> Result<()> {
        (**self).write_cell(worksheet, cell, value)
    }
}
