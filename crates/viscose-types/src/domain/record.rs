use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity of a consumed stats export: the path plus a modification signature.
///
/// A re-export under the same file name produces a different id, so the ledger
/// never hides fresh content behind a stale entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFileId(String);

impl SourceFileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_signature(path: &Path, signature: FileSignature) -> Self {
        Self(format!(
            "{}@{}:{}",
            path.display(),
            signature.modified_nanos,
            signature.size
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cheap change detector for a file on disk (no content read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileSignature {
    /// Modification time in nanoseconds since the Unix epoch (0 when unknown)
    pub modified_nanos: u128,
    pub size: u64,
}

impl FileSignature {
    pub fn new(modified: SystemTime, size: u64) -> Self {
        let modified_nanos = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self {
            modified_nanos,
            size,
        }
    }

    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        Self::new(modified, metadata.len())
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        let nanos = i64::try_from(self.modified_nanos).unwrap_or(i64::MAX);
        DateTime::from_timestamp_nanos(nanos)
    }
}

/// One parsed stats export, reduced to the best attempt it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub scenario: String,
    pub metric_value: f64,
    pub source_file_id: SourceFileId,
    pub observed_at: DateTime<Utc>,
}

/// Durable best score for a scenario (keyed by exact, case-sensitive name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalBestEntry {
    pub scenario: String,
    pub best_value: f64,
    pub last_updated_at: DateTime<Utc>,
}
