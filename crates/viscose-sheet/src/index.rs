use log::{debug, warn};
use viscose_types::{CellRef, WriteTarget};

use crate::transport::{Grid, SheetTransport};
use crate::{Result, ScanColumns};

/// One worksheet's values as read in a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetSnapshot {
    pub name: String,
    pub grid: Grid,
}

impl WorksheetSnapshot {
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }
}

/// Column in a worksheet's header row that holds personal bests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreColumnBinding {
    pub column: u32,
    pub header: String,
}

/// Where a scenario's score should go, if anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(WriteTarget),
    UnresolvedScenario,
    UnresolvedColumn { worksheet: String },
}

/// Find the personal-best column in a header row.
///
/// Matching is case-insensitive substring containment of any phrase; the
/// leftmost matching cell wins regardless of phrase order.
pub fn find_score_column<S: AsRef<str>>(
    header_row: &[String],
    phrases: &[S],
) -> Option<ScoreColumnBinding> {
    let phrases: Vec<String> = phrases
        .iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();

    header_row.iter().enumerate().find_map(|(col, cell)| {
        let lowered = cell.to_lowercase();
        phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
            .then(|| ScoreColumnBinding {
                column: col as u32,
                header: cell.clone(),
            })
    })
}

/// Find the first row (0-based, below the header) whose scan columns contain
/// exactly `scenario`.
pub fn find_scenario_row(grid: &Grid, scenario: &str, scan: &ScanColumns) -> Option<u32> {
    scan_cells(grid, scan)
        .find(|(_, text)| *text == scenario)
        .map(|(row, _)| row)
}

/// Scenario cells in row-major order, skipping the header row.
fn scan_cells<'a>(grid: &'a Grid, scan: &ScanColumns) -> impl Iterator<Item = (u32, &'a str)> {
    let first = scan.first() as usize;
    let last = scan.last() as usize;

    grid.iter().enumerate().skip(1).flat_map(move |(row, cells)| {
        cells
            .iter()
            .enumerate()
            .skip(first)
            .take_while(move |(col, _)| *col <= last)
            .filter(|(_, text)| !text.is_empty())
            .map(move |(_, text)| (row as u32, text.as_str()))
    })
}

#[derive(Debug)]
struct WorksheetIndex {
    name: String,
    score_column: Option<ScoreColumnBinding>,
    grid: Grid,
}

impl WorksheetIndex {
    fn classify<S: AsRef<str>>(snapshot: WorksheetSnapshot, phrases: &[S]) -> Self {
        let score_column = snapshot
            .grid
            .first()
            .and_then(|header| find_score_column(header, phrases));

        match &score_column {
            Some(binding) => debug!(
                "Worksheet '{}': score column '{}' ({} rows)",
                snapshot.name,
                binding.header,
                snapshot.grid.len()
            ),
            None => debug!("Worksheet '{}': no score column", snapshot.name),
        }

        Self {
            name: snapshot.name,
            score_column,
            grid: snapshot.grid,
        }
    }
}

/// Scenario and score-column layout of the spreadsheet for one sync cycle
#[derive(Debug, Default)]
pub struct SheetIndex {
    worksheets: Vec<WorksheetIndex>,
    scan: ScanColumns,
}

impl SheetIndex {
    /// Classify every snapshot. Snapshot order is resolution precedence.
    pub fn build<S: AsRef<str>>(
        snapshots: Vec<WorksheetSnapshot>,
        phrases: &[S],
        scan: &ScanColumns,
    ) -> Self {
        let worksheets = snapshots
            .into_iter()
            .map(|snapshot| WorksheetIndex::classify(snapshot, phrases))
            .collect();

        Self {
            worksheets,
            scan: *scan,
        }
    }

    pub fn resolve(&self, scenario: &str) -> Resolution {
        let mut columnless: Option<&str> = None;

        for ws in &self.worksheets {
            let Some(row) = find_scenario_row(&ws.grid, scenario, &self.scan) else {
                continue;
            };
            match &ws.score_column {
                Some(binding) => {
                    return Resolution::Resolved(WriteTarget {
                        worksheet: ws.name.clone(),
                        cell: CellRef::new(row, binding.column),
                        header: binding.header.clone(),
                    });
                }
                None => {
                    columnless.get_or_insert(ws.name.as_str());
                }
            }
        }

        match columnless {
            Some(worksheet) => Resolution::UnresolvedColumn {
                worksheet: worksheet.to_string(),
            },
            None => Resolution::UnresolvedScenario,
        }
    }
}

/// Read the spreadsheet (one request per worksheet) and build its index.
///
/// With a filter, only the named worksheets are read; names the spreadsheet
/// does not have are reported and ignored.
pub fn load_index<T, S>(
    transport: &T,
    filter: Option<&[String]>,
    phrases: &[S],
    scan: &ScanColumns,
) -> Result<SheetIndex>
where
    T: SheetTransport + ?Sized,
    S: AsRef<str>,
{
    let mut names = transport.worksheet_names()?;

    if let Some(filter) = filter {
        for wanted in filter {
            if !names.contains(wanted) {
                warn!("Worksheet '{}' from worksheet_filter not found in spreadsheet", wanted);
            }
        }
        names.retain(|name| filter.contains(name));
    }

    let mut snapshots = Vec::with_capacity(names.len());
    for name in names {
        let grid = transport.read_grid(&name)?;
        snapshots.push(WorksheetSnapshot::new(name, grid));
    }

    Ok(SheetIndex::build(snapshots, phrases, scan))
}
