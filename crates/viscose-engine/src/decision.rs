use viscose_store::StateStore;
use viscose_types::{ResultRecord, SyncOutcome};

/// What to do with a record, decided from local state alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Nothing to write; `mark_processed` says whether the ledger takes the file
    Skip {
        outcome: SyncOutcome,
        mark_processed: bool,
    },
    /// Strict improvement (or first value) for the scenario
    Write { previous_best: Option<f64> },
}

/// Decide a record without performing I/O or side effects.
pub fn evaluate<S: StateStore + ?Sized>(store: &S, record: &ResultRecord) -> Decision {
    if store.is_processed(&record.source_file_id) {
        return Decision::Skip {
            outcome: SyncOutcome::SkippedAlreadyProcessed,
            mark_processed: false,
        };
    }

    match store.get_best(&record.scenario) {
        Some(best) if record.metric_value <= best => Decision::Skip {
            outcome: SyncOutcome::SkippedNotImprovement { best },
            mark_processed: true,
        },
        previous_best => Decision::Write { previous_best },
    }
}
