//! Fixtures for sample data generation.
//!
//! Stats exports follow the KovaaK's layout: a kill table, a weapon table and
//! a block of `Key:,value` rows that carries the scenario name and score.

use anyhow::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// A stats export for `scenario` whose `Score:` row is `score`.
pub fn stats_csv(scenario: &str, score: f64) -> String {
    let mut out = String::new();
    out.push_str(
        "Kill #,Timestamp,Bot,Weapon,TTK,Shots,Hits,Accuracy,Damage Done,Damage Possible,Efficiency,Cheated,OverShots\n",
    );
    for kill in 1..=3 {
        let _ = writeln!(
            out,
            "{kill},12:00:0{kill}.250,Target,Pistol,0.4{kill}s,2,1,0.5,100.0,100.0,1.0,false,0"
        );
    }
    out.push('\n');
    out.push_str("Weapon,Shots,Hits,Damage Done,Damage Possible,,Sens Scale,Horiz Sens,Vert Sens,FOV\n");
    out.push_str("Pistol,6,3,300.0,300.0,,Valorant,0.35,0.35,103.0\n");
    out.push('\n');
    out.push_str("Kills:,3\nDeaths:,0\nFight Time:,60.0\nAvg TTK:,0.42\nDamage Done:,300.0\n");
    let _ = writeln!(out, "Score:,{}", score);
    let _ = writeln!(out, "Scenario:,{}", scenario);
    out.push_str("Hash:,0f1e2d3c4b5a\nGame Version:,3.4.5\nChallenge Start:,12:00:00.000\n");
    out
}

/// A stats export missing its `Score:` row.
pub fn stats_csv_without_score(scenario: &str) -> String {
    format!("Kills:,3\nScenario:,{}\n", scenario)
}

/// Worksheet rows as CSV text.
pub fn worksheet_csv(rows: &[&[&str]]) -> String {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        // Writing into a Vec cannot fail.
        let _ = writer.write_record(*row);
    }
    let bytes = writer.into_inner().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Read one worksheet CSV back into rows.
pub fn read_worksheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Config for a local-workbook workspace.
pub fn local_config_toml(stats_root: &Path, sheet_dir: &Path) -> String {
    format!(
        "stats_root = {:?}\npoll_interval_secs = 1.0\n\n[sheet]\nbackend = \"local\"\npath = {:?}\n",
        stats_root.display().to_string(),
        sheet_dir.display().to_string()
    )
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_csv_carries_key_rows() {
        let csv = stats_csv("Pasu", 120.5);
        assert!(csv.contains("Scenario:,Pasu\n"));
        assert!(csv.contains("Score:,120.5\n"));
    }

    #[test]
    fn test_worksheet_csv_quotes_commas() {
        let csv = worksheet_csv(&[&["Scenario", "High Score"], &["Pasu, Reload", ""]]);
        assert_eq!(csv, "Scenario,High Score\n\"Pasu, Reload\",\n");
    }
}
