//! Custom assertions for viscose-specific validation.
//!
//! Works on the JSON printed by `viscose --format json sync`.

use anyhow::{Context, Result};
use serde_json::Value;

/// Outcome tags of the report's files, in processing order.
pub fn outcomes(report: &Value) -> Result<Vec<String>> {
    let files = report["files"]
        .as_array()
        .context("Expected 'files' array in JSON")?;

    files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            file["outcome"]
                .as_str()
                .map(String::from)
                .with_context(|| format!("File {} missing outcome", i))
        })
        .collect()
}

/// Assert the report's outcome tags, in order.
pub fn assert_outcomes(report: &Value, expected: &[&str]) -> Result<()> {
    let actual = outcomes(report)?;
    if actual != expected {
        anyhow::bail!("Expected outcomes {:?}, got {:?}", expected, actual);
    }
    Ok(())
}

/// Assert the `summary.written` count.
pub fn assert_written(report: &Value, expected: u64) -> Result<()> {
    let written = report["summary"]["written"]
        .as_u64()
        .context("Expected 'summary.written' in JSON")?;
    if written != expected {
        anyhow::bail!("Expected {} writes, got {}", expected, written);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assert_outcomes() {
        let report = json!({
            "files": [
                {"path": "a.csv", "outcome": "written"},
                {"path": "b.csv", "outcome": "skipped_not_improvement"}
            ],
            "summary": {"written": 1}
        });

        assert!(assert_outcomes(&report, &["written", "skipped_not_improvement"]).is_ok());
        assert!(assert_outcomes(&report, &["written"]).is_err());
        assert!(assert_written(&report, 1).is_ok());
        assert!(assert_written(&report, 2).is_err());
    }
}
