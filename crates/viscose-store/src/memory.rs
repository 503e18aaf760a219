use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use viscose_types::{PersonalBestEntry, SourceFileId};

use crate::Result;
use crate::store::StateStore;

/// Volatile [`StateStore`] for tests and dry runs
#[derive(Debug, Default, Clone)]
pub struct MemoryStateStore {
    bests: BTreeMap<String, PersonalBestEntry>,
    processed: HashSet<SourceFileId>,
    flushes: usize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(mut self, scenario: &str, value: f64) -> Self {
        self.record_best(scenario, value, Utc::now());
        self
    }

    /// Number of `flush` calls so far
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl StateStore for MemoryStateStore {
    fn get_best(&self, scenario: &str) -> Option<f64> {
        self.bests.get(scenario).map(|entry| entry.best_value)
    }

    fn record_best(&mut self, scenario: &str, value: f64, at: DateTime<Utc>) {
        self.bests.insert(
            scenario.to_string(),
            PersonalBestEntry {
                scenario: scenario.to_string(),
                best_value: value,
                last_updated_at: at,
            },
        );
    }

    fn is_processed(&self, id: &SourceFileId) -> bool {
        self.processed.contains(id)
    }

    fn mark_processed(&mut self, id: &SourceFileId) {
        self.processed.insert(id.clone());
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn bests(&self) -> Vec<PersonalBestEntry> {
        self.bests.values().cloned().collect()
    }

    fn processed_count(&self) -> usize {
        self.processed.len()
    }
}
