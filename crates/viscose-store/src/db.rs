use chrono::{DateTime, Utc};
use log::{debug, warn};
use rusqlite::Connection;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use viscose_types::{PersonalBestEntry, SourceFileId};

use crate::queries::{best_scores, ledger};
use crate::schema::init_schema;
use crate::store::StateStore;
use crate::Result;

/// How the state file was found when the store was opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No state file existed; starting empty
    Fresh,
    /// Existing state loaded
    Loaded { bests: usize, processed: usize },
    /// The state file was unreadable; it was moved to `backup` and state
    /// restarted empty. Prior best tracking is lost.
    Recovered { backup: PathBuf, reason: String },
}

/// SQLite-backed [`StateStore`].
///
/// Both tables are loaded at open. Mutations stay in memory until `flush`,
/// which writes them in a single transaction: an interrupted flush rolls back
/// and the previously committed state stays intact.
pub struct SqliteStateStore {
    conn: Connection,
    bests: BTreeMap<String, PersonalBestEntry>,
    processed: HashSet<SourceFileId>,
    dirty_bests: BTreeSet<String>,
    pending_processed: Vec<(SourceFileId, DateTime<Utc>)>,
}

impl SqliteStateStore {
    /// Open (or create) the state file, recovering from corruption.
    pub fn open(path: &Path) -> Result<(Self, LoadStatus)> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let existed = path.exists();

        match Self::load(Connection::open(path)?) {
            Ok(store) => {
                let status = if existed {
                    LoadStatus::Loaded {
                        bests: store.bests.len(),
                        processed: store.processed.len(),
                    }
                } else {
                    LoadStatus::Fresh
                };
                Ok((store, status))
            }
            Err(err) if err.is_corruption() => {
                let backup = quarantine(path)?;
                warn!(
                    "State file {} is unreadable ({}); moved to {} and starting with empty state",
                    path.display(),
                    err,
                    backup.display()
                );
                let store = Self::load(Connection::open(path)?)?;
                Ok((
                    store,
                    LoadStatus::Recovered {
                        backup,
                        reason: err.to_string(),
                    },
                ))
            }
            Err(err) => Err(err),
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::load(Connection::open_in_memory()?)
    }

    fn load(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;

        let bests = best_scores::get_all(&conn)?
            .into_iter()
            .map(|entry| (entry.scenario.clone(), entry))
            .collect();
        let processed = ledger::get_all_ids(&conn)?.into_iter().collect();

        Ok(Self {
            conn,
            bests,
            processed,
            dirty_bests: BTreeSet::new(),
            pending_processed: Vec::new(),
        })
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.dirty_bests.is_empty() || !self.pending_processed.is_empty()
    }
}

impl StateStore for SqliteStateStore {
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
        self.dirty_bests.insert(scenario.to_string());
    }

    fn is_processed(&self, id: &SourceFileId) -> bool {
        self.processed.contains(id)
    }

    fn mark_processed(&mut self, id: &SourceFileId) {
        if self.processed.insert(id.clone()) {
            self.pending_processed.push((id.clone(), Utc::now()));
        }
    }

    fn flush(&mut self) -> Result<()> {
        if !self.has_pending_changes() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for scenario in &self.dirty_bests {
            if let Some(entry) = self.bests.get(scenario) {
                best_scores::upsert(&tx, entry)?;
            }
        }
        for (id, processed_at) in &self.pending_processed {
            ledger::insert(&tx, id, *processed_at)?;
        }
        tx.commit()?;

        debug!(
            "Flushed {} best score(s) and {} ledger entr(ies)",
            self.dirty_bests.len(),
            self.pending_processed.len()
        );
        self.dirty_bests.clear();
        self.pending_processed.clear();
        Ok(())
    }

    fn bests(&self) -> Vec<PersonalBestEntry> {
        self.bests.values().cloned().collect()
    }

    fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

impl Drop for SqliteStateStore {
    fn drop(&mut self) {
        if self.has_pending_changes()
            && let Err(err) = self.flush()
        {
            warn!("Failed to persist state on shutdown: {}", err);
        }
    }
}

/// Move a bad state file (and its rollback journal) out of the way.
fn quarantine(path: &Path) -> Result<PathBuf> {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "state.db".to_string());
    let backup = path.with_file_name(format!("{}.corrupt-{}", file_name, stamp));

    std::fs::rename(path, &backup)?;

    let journal = path.with_file_name(format!("{}-journal", file_name));
    if journal.exists() {
        std::fs::remove_file(journal)?;
    }

    Ok(backup)
}
