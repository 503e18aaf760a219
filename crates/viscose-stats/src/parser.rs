use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use viscose_types::{FileSignature, ResultRecord, SourceFileId};

use crate::error::{Error, Result};

/// Summary key holding an attempt's score in KovaaK's exports (`Score:`)
pub const DEFAULT_SCORE_FIELD: &str = "Score";

const SCENARIO_KEY: &str = "Scenario:";

/// Parse a stats export from disk.
///
/// The file's metadata supplies the source identity and the observation time.
pub fn parse_stats_file(path: &Path, score_field: &str) -> Result<ResultRecord> {
    let metadata = std::fs::metadata(path)?;
    let signature = FileSignature::from_metadata(&metadata);
    let file = File::open(path)?;

    parse_stats_reader(
        file,
        path,
        score_field,
        SourceFileId::from_signature(path, signature),
        signature.modified_at(),
    )
}

/// Parse stats export content.
///
/// Every row is read as `key,value,...`. The export's leading kill and weapon
/// tables never start with a summary key, so they fall through untouched.
/// When several score rows exist the highest wins; equal maxima keep the
/// first occurrence.
pub fn parse_stats_reader<R: Read>(
    reader: R,
    path: &Path,
    score_field: &str,
    source_file_id: SourceFileId,
    observed_at: DateTime<Utc>,
) -> Result<ResultRecord> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let score_key = format!("{}:", score_field);
    let mut saw_content = false;
    let mut scenario: Option<String> = None;
    let mut best: Option<f64> = None;

    for row in csv.records() {
        let row = row?;
        let Some(first) = row.get(0) else {
            continue;
        };
        let key = first.trim_start_matches('\u{feff}').trim();
        if key.is_empty() {
            continue;
        }
        saw_content = true;

        if key == SCENARIO_KEY {
            if scenario.is_none() {
                scenario = Some(row.get(1).unwrap_or("").trim().to_string());
            }
        } else if key == score_key {
            let raw = row.get(1).unwrap_or("").trim();
            let value = parse_score(raw).ok_or_else(|| {
                Error::parse(
                    path,
                    format!("could not parse {} value '{}' as a number", score_field, raw),
                )
            })?;
            if best.is_none_or(|current| value > current) {
                best = Some(value);
            }
        }
    }

    if !saw_content {
        return Err(Error::parse(path, "file is empty"));
    }

    let scenario = match scenario {
        Some(name) if !name.is_empty() => name,
        Some(_) => return Err(Error::parse(path, "'Scenario:' entry is blank")),
        None => return Err(Error::parse(path, "no 'Scenario:' entry found")),
    };

    let metric_value =
        best.ok_or_else(|| Error::parse(path, format!("no '{}' entry found", score_key)))?;

    Ok(ResultRecord {
        scenario,
        metric_value,
        source_file_id,
        observed_at,
    })
}

fn parse_score(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
