use chrono::Utc;
use log::{debug, info, warn};
use viscose_sheet::{Resolution, ScanColumns, SheetIndex, SheetTransport, load_index};
use viscose_store::StateStore;
use viscose_types::{ResultRecord, SyncOutcome, format_score};

use crate::decision::{Decision, evaluate};
use crate::Result;

/// How the sheet is searched when building an index
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Score header phrases, highest priority first
    pub score_headers: Vec<String>,
    pub worksheet_filter: Option<Vec<String>>,
    pub scan_columns: ScanColumns,
}

enum IndexState {
    Unloaded,
    Ready(SheetIndex),
    Failed(String),
}

/// Applies sync decisions: sheet writes, best tracking and the ledger.
///
/// The sheet index is built on first need in a cycle and reused until
/// [`SyncEngine::begin_cycle`]. A failed build is remembered for the rest of
/// the cycle so a broken remote costs one read attempt per cycle.
pub struct SyncEngine<S, T> {
    store: S,
    transport: T,
    options: IndexOptions,
    index: IndexState,
}

impl<S: StateStore, T: SheetTransport> SyncEngine<S, T> {
    pub fn new(store: S, transport: T, options: IndexOptions) -> Self {
        Self {
            store,
            transport,
            options,
            index: IndexState::Unloaded,
        }
    }

    /// Drop the cached sheet index so the next write decision re-reads the sheet.
    pub fn begin_cycle(&mut self) {
        self.index = IndexState::Unloaded;
    }

    pub fn process(&mut self, record: &ResultRecord) -> SyncOutcome {
        let previous_best = match evaluate(&self.store, record) {
            Decision::Skip {
                outcome,
                mark_processed,
            } => {
                if mark_processed {
                    self.store.mark_processed(&record.source_file_id);
                }
                debug!(
                    "{} ({}): {}",
                    record.scenario,
                    format_score(record.metric_value),
                    outcome.kind()
                );
                return outcome;
            }
            Decision::Write { previous_best } => previous_best,
        };

        let resolution = match self.index() {
            Ok(index) => index.resolve(&record.scenario),
            Err(reason) => return SyncOutcome::TransportFailed { reason },
        };

        let target = match resolution {
            Resolution::Resolved(target) => target,
            Resolution::UnresolvedScenario => {
                debug!("No worksheet row for scenario '{}'", record.scenario);
                return SyncOutcome::SkippedUnresolvedScenario;
            }
            Resolution::UnresolvedColumn { worksheet } => {
                debug!(
                    "Scenario '{}' found in worksheet '{}' which has no score column",
                    record.scenario, worksheet
                );
                return SyncOutcome::SkippedUnresolvedColumn { worksheet };
            }
        };

        if let Err(err) =
            self.transport
                .write_cell(&target.worksheet, target.cell, record.metric_value)
        {
            warn!("Failed to write {} to {}: {}", record.scenario, target, err);
            return SyncOutcome::TransportFailed {
                reason: err.to_string(),
            };
        }

        self.store
            .record_best(&record.scenario, record.metric_value, Utc::now());
        self.store.mark_processed(&record.source_file_id);
        if let Err(err) = self.store.flush() {
            warn!("Failed to persist state after write: {}", err);
        }

        info!(
            "{}: {} -> {}",
            record.scenario,
            format_score(record.metric_value),
            target
        );

        SyncOutcome::Written {
            target,
            value: record.metric_value,
            previous_best,
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_parts(self) -> (S, T) {
        (self.store, self.transport)
    }

    fn index(&mut self) -> std::result::Result<&SheetIndex, String> {
        if let IndexState::Unloaded = self.index {
            self.index = match load_index(
                &self.transport,
                self.options.worksheet_filter.as_deref(),
                self.options.score_headers.as_slice(),
                &self.options.scan_columns,
            ) {
                Ok(index) => IndexState::Ready(index),
                Err(err) => {
                    warn!("Failed to read spreadsheet layout: {}", err);
                    IndexState::Failed(err.to_string())
                }
            };
        }

        match &self.index {
            IndexState::Ready(index) => Ok(index),
            IndexState::Failed(reason) => Err(reason.clone()),
            IndexState::Unloaded => Err("sheet index not loaded".to_string()),
        }
    }
}
