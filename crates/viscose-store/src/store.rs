use chrono::{DateTime, Utc};
use viscose_types::{PersonalBestEntry, SourceFileId};

use crate::Result;

/// Durable state consulted and mutated by the sync engine.
///
/// Mutations are staged; `flush` makes them durable without ever leaving a
/// half-written state behind. Implementations assume a single writer.
pub trait StateStore {
    fn get_best(&self, scenario: &str) -> Option<f64>;

    /// Unconditional overwrite; callers verify the improvement first.
    fn record_best(&mut self, scenario: &str, value: f64, at: DateTime<Utc>);

    fn is_processed(&self, id: &SourceFileId) -> bool;

    fn mark_processed(&mut self, id: &SourceFileId);

    fn flush(&mut self) -> Result<()>;

    /// All recorded bests, ordered by scenario name
    fn bests(&self) -> Vec<PersonalBestEntry>;

    fn processed_count(&self) -> usize;
}
