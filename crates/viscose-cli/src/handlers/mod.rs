pub mod bests;
pub mod config;
pub mod import_legacy;
pub mod init;
pub mod sync;
pub mod watch;

use serde::Serialize;
use viscose_store::LoadStatus;
use viscose_types::{SyncReport, SyncSummary};

/// JSON shape of a sync report: the report plus its summary counts
#[derive(Serialize)]
struct ReportJson<'a> {
    #[serde(flatten)]
    report: &'a SyncReport,
    summary: SyncSummary,
}

fn report_json(report: &SyncReport) -> ReportJson<'_> {
    ReportJson {
        report,
        summary: report.summary(),
    }
}

/// Tell the user when the state file had to be reset.
fn surface_load_status(status: &LoadStatus) {
    if let LoadStatus::Recovered { backup, reason } = status {
        eprintln!(
            "Warning: state was unreadable ({}) and has been reset; the old file was kept at {}",
            reason,
            backup.display()
        );
        eprintln!(
            "Warning: the next result for every scenario counts as a new personal best"
        );
    }
}
