use chrono::Utc;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use viscose_engine::SyncEngine;
use viscose_sheet::SheetTransport;
use viscose_stats::{StatsFile, discover_stats_files};
use viscose_store::StateStore;
use viscose_types::{FileReport, FileSignature, SyncOutcome, SyncReport};

use crate::{CancellationToken, Pacer, Result, Wake};

/// Where stats exports are read from
#[derive(Debug, Clone)]
pub struct SyncSource {
    pub stats_root: PathBuf,
    pub recursive: bool,
    pub score_field: String,
}

#[derive(Debug, Clone, Copy)]
struct SeenFile {
    signature: FileSignature,
    settled: bool,
}

/// Drives stats files through the engine, once or continuously.
pub struct Syncer<S, T> {
    engine: SyncEngine<S, T>,
    source: SyncSource,
}

impl<S: StateStore, T: SheetTransport> Syncer<S, T> {
    pub fn new(engine: SyncEngine<S, T>, source: SyncSource) -> Self {
        Self { engine, source }
    }

    pub fn engine(&self) -> &SyncEngine<S, T> {
        &self.engine
    }

    pub fn into_engine(self) -> SyncEngine<S, T> {
        self.engine
    }

    /// Process every stats file once, oldest first, and persist state.
    pub fn run_once(&mut self) -> Result<SyncReport> {
        self.engine.begin_cycle();
        let files = discover_stats_files(&self.source.stats_root, self.source.recursive)?;

        let mut report = SyncReport::new(Utc::now());
        for file in &files {
            let (file_report, _) = self.sync_file(file);
            report.push(file_report);
        }

        self.engine.flush()?;
        log_summary(&report);
        Ok(report)
    }

    /// Run ticks until `cancel` fires, pausing through `pacer` in between.
    ///
    /// Unchanged files whose last outcome was settled are not reparsed.
    /// `on_tick` receives the outcomes of each tick. Returns the number of
    /// completed ticks; state is flushed before returning.
    pub fn run_watch<P, F>(
        &mut self,
        cancel: &CancellationToken,
        pacer: &mut P,
        mut on_tick: F,
    ) -> Result<usize>
    where
        P: Pacer + ?Sized,
        F: FnMut(&SyncReport),
    {
        let mut seen: HashMap<PathBuf, SeenFile> = HashMap::new();
        let mut ticks = 0;

        while !cancel.is_cancelled() {
            match self.tick(&mut seen) {
                Ok(report) => on_tick(&report),
                Err(err) if ticks > 0 => warn!("Watch tick failed: {}", err),
                Err(err) => {
                    self.engine.flush()?;
                    return Err(err);
                }
            }
            ticks += 1;

            if pacer.pause(cancel) == Wake::Cancelled {
                break;
            }
        }

        self.engine.flush()?;
        info!("Watch stopped after {} tick(s)", ticks);
        Ok(ticks)
    }

    fn tick(&mut self, seen: &mut HashMap<PathBuf, SeenFile>) -> Result<SyncReport> {
        self.engine.begin_cycle();
        let files = discover_stats_files(&self.source.stats_root, self.source.recursive)?;

        let present: HashSet<&PathBuf> = files.iter().map(|f| &f.path).collect();
        seen.retain(|path, _| present.contains(path));

        let mut report = SyncReport::new(Utc::now());
        for file in &files {
            if let Some(prev) = seen.get(&file.path)
                && prev.settled
                && prev.signature == file.signature
            {
                continue;
            }

            let (file_report, settled) = self.sync_file(file);
            seen.insert(
                file.path.clone(),
                SeenFile {
                    signature: file.signature,
                    settled,
                },
            );
            report.push(file_report);
        }

        self.engine.flush()?;
        if !report.files.is_empty() {
            log_summary(&report);
        }
        Ok(report)
    }

    /// Push one file through the engine. The flag tells whether the same
    /// file contents would give the same outcome next cycle.
    fn sync_file(&mut self, file: &StatsFile) -> (FileReport, bool) {
        // Ledger first: processed exports are never read again.
        if self.engine.store().is_processed(&file.source_file_id()) {
            debug!("Already processed: {}", file.path.display());
            let report = FileReport {
                path: file.path.clone(),
                scenario: None,
                outcome: SyncOutcome::SkippedAlreadyProcessed,
            };
            return (report, true);
        }

        match file.parse(&self.source.score_field) {
            Ok(record) => {
                let outcome = self.engine.process(&record);
                let settled = outcome.is_settled();
                let report = FileReport {
                    path: file.path.clone(),
                    scenario: Some(record.scenario),
                    outcome,
                };
                (report, settled)
            }
            Err(err) => parse_failure(file, &err),
        }
    }
}

/// A file that could not be turned into a record. Read errors are retried
/// next cycle; malformed contents wait for the file to change.
fn parse_failure(file: &StatsFile, err: &viscose_stats::Error) -> (FileReport, bool) {
    warn!("Skipping {}: {}", file.path.display(), err);
    let report = FileReport {
        path: file.path.clone(),
        scenario: None,
        outcome: SyncOutcome::ParseFailed {
            reason: err.to_string(),
        },
    };
    (report, !err.is_transient())
}

fn log_summary(report: &SyncReport) {
    let summary = report.summary();
    info!(
        "Sync: {} written, {} not improved, {} already processed, {} unresolved, {} failed",
        summary.written,
        summary.not_improvement,
        summary.already_processed,
        summary.unresolved,
        summary.parse_failed + summary.transport_failed
    );
}
