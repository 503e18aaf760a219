// Remote spreadsheet side of the sync.
//
// `index` classifies a grid snapshot (pure functions, no IO); `transport`
// holds the read/write capability and its implementations.

pub mod error;
mod index;
mod scan;
pub mod transport;

pub use error::{Error, Result};
pub use index::{
    Resolution, ScoreColumnBinding, SheetIndex, WorksheetSnapshot, find_scenario_row,
    find_score_column, load_index,
};
pub use scan::ScanColumns;
pub use transport::{
    GoogleSheetsTransport, Grid, LocalWorkbook, MemorySheet, SheetTransport, WriteRecord,
};
