use chrono::Utc;
use log::info;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::Result;
use crate::store::StateStore;

// Shape of the JSON state written by the legacy uploader. Only best scores
// carry over: its ledger holds bare paths without a modification signature.
#[derive(Debug, Default, Deserialize)]
struct LegacyState {
    #[serde(default)]
    scenarios: BTreeMap<String, LegacyScenario>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyScenario {
    #[serde(default)]
    best_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Scenarios whose best was raised (or created) by the import
    pub imported: usize,
    /// Scenarios where the local best was already at least as high
    pub kept: usize,
}

/// Merge best scores from a legacy `state.json` into `store` and flush.
///
/// The higher value wins, so importing never lowers a recorded best.
pub fn import_legacy_state<S: StateStore>(store: &mut S, path: &Path) -> Result<ImportSummary> {
    let content = std::fs::read_to_string(path)?;
    let legacy: LegacyState = serde_json::from_str(&content)?;

    let now = Utc::now();
    let mut summary = ImportSummary::default();

    for (scenario, entry) in legacy.scenarios {
        let Some(score) = entry.best_score.filter(|v| v.is_finite()) else {
            continue;
        };

        if store.get_best(&scenario).is_some_and(|best| best >= score) {
            summary.kept += 1;
            continue;
        }

        store.record_best(&scenario, score, now);
        summary.imported += 1;
    }

    store.flush()?;
    info!(
        "Imported {} legacy best score(s), kept {} existing",
        summary.imported, summary.kept
    );
    Ok(summary)
}
