use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::outcome::{OutcomeKind, SyncOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

/// Per-file outcomes of one sync run, in processing order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub written: usize,
    pub already_processed: usize,
    pub not_improvement: usize,
    pub unresolved: usize,
    pub parse_failed: usize,
    pub transport_failed: usize,
}

impl SyncReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            files: Vec::new(),
        }
    }

    pub fn push(&mut self, report: FileReport) {
        self.files.push(report);
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.files
            .iter()
            .filter(|f| f.outcome.kind() == kind)
            .count()
    }

    pub fn writes(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| f.outcome.kind() == OutcomeKind::Written)
    }

    pub fn summary(&self) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for file in &self.files {
            match file.outcome.kind() {
                OutcomeKind::Written => summary.written += 1,
                OutcomeKind::SkippedAlreadyProcessed => summary.already_processed += 1,
                OutcomeKind::SkippedNotImprovement => summary.not_improvement += 1,
                OutcomeKind::SkippedUnresolvedScenario | OutcomeKind::SkippedUnresolvedColumn => {
                    summary.unresolved += 1
                }
                OutcomeKind::ParseFailed => summary.parse_failed += 1,
                OutcomeKind::TransportFailed => summary.transport_failed += 1,
            }
        }
        summary
    }
}
