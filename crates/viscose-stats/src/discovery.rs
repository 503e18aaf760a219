use log::warn;
use std::fs::File;
use std::path::{Path, PathBuf};
use viscose_types::{FileSignature, ResultRecord, SourceFileId};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::parser::parse_stats_reader;

/// A stats export found on disk, with the signature observed at discovery time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsFile {
    pub path: PathBuf,
    pub signature: FileSignature,
}

impl StatsFile {
    pub fn source_file_id(&self) -> SourceFileId {
        SourceFileId::from_signature(&self.path, self.signature)
    }

    /// Parse the file, tagging the record with the discovery-time identity.
    pub fn parse(&self, score_field: &str) -> Result<ResultRecord> {
        let file = File::open(&self.path)?;
        parse_stats_reader(
            file,
            &self.path,
            score_field,
            self.source_file_id(),
            self.signature.modified_at(),
        )
    }
}

/// Enumerate `*.csv` exports under `root` in a stable order.
///
/// Ordering is modification time ascending, then path, so replaying a
/// directory always feeds records in the order they were produced.
pub fn discover_stats_files(root: &Path, recursive: bool) -> Result<Vec<StatsFile>> {
    let metadata = std::fs::metadata(root).map_err(|err| Error::StatsRoot {
        path: root.to_path_buf(),
        message: err.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(Error::StatsRoot {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_csv(entry.path()) {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => files.push(StatsFile {
                path: entry.path().to_path_buf(),
                signature: FileSignature::from_metadata(&metadata),
            }),
            Err(err) => warn!("Skipping {}: {}", entry.path().display(), err),
        }
    }

    files.sort_by(|a, b| {
        a.signature
            .modified_nanos
            .cmp(&b.signature.modified_nanos)
            .then_with(|| a.path.cmp(&b.path))
    });

    Ok(files)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_csv() {
        assert!(is_csv(Path::new("a/Pasu - Challenge Stats.csv")));
        assert!(is_csv(Path::new("b.CSV")));
        assert!(!is_csv(Path::new("c.csv.bak")));
        assert!(!is_csv(Path::new("README")));
    }
}
