use anyhow::Result;
use viscose_runtime::Workspace;
use viscose_types::OutcomeKind;

use super::{report_json, surface_load_status};
use crate::types::OutputFormat;
use crate::views::{self, FileLineView, SummaryView};

/// One-shot sync. Per-file failures are reported, not turned into an error exit.
///
/// Plain output lists only files this run acted on unless `verbose` is set;
/// the summary line always counts every file.
pub fn handle(workspace: &Workspace, format: OutputFormat, verbose: bool) -> Result<()> {
    let (mut syncer, status) = workspace.syncer()?;
    surface_load_status(&status);

    let report = syncer.run_once()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
        }
        OutputFormat::Plain => {
            let color = views::use_color();
            let root = workspace.stats_root();
            for file in report
                .files
                .iter()
                .filter(|f| verbose || f.outcome.kind() != OutcomeKind::SkippedAlreadyProcessed)
            {
                println!("{}", FileLineView::new(file, &root, color));
            }
            println!("{}", SummaryView::new(report.files.len(), report.summary(), color));
        }
    }
    Ok(())
}
