//! Sync Command Tests
//!
//! End-to-end runs against a local CSV workbook:
//! - New personal bests are written to the bound cell, regressions are skipped
//! - Reruns over unchanged files write nothing
//! - Unresolved scenarios are retried once the sheet gains a row
//! - Per-file failures keep the exit code at zero

use anyhow::Result;
use viscose_testing::TestWorld;
use viscose_testing::assertions::{assert_outcomes, assert_written};

fn benchmark_world() -> TestWorld {
    TestWorld::new()
        .with_worksheet(
            "Novice",
            &[
                &["Scenario", "Rank", "High Score"],
                &["Pasu", "", ""],
                &["1wall6targets TE", "", ""],
            ],
        )
        .with_local_config()
}

fn sync_json(world: &TestWorld) -> Result<serde_json::Value> {
    let result = world.run(&["--format", "json", "sync"])?;
    assert!(result.success(), "sync failed: {}", result.stderr());
    result.json()
}

#[test]
fn test_sync_writes_new_personal_bests() -> Result<()> {
    let world = benchmark_world();
    world.add_stats_file("Pasu - 1.csv", "Pasu", 120.0)?;
    world.add_stats_file("Pasu - 2.csv", "Pasu", 115.0)?;

    let report = sync_json(&world)?;
    assert_outcomes(&report, &["written", "skipped_not_improvement"])?;
    assert_written(&report, 1)?;
    assert_eq!(report["files"][0]["target"]["cell"], "C2");
    assert_eq!(report["files"][1]["best"], 120.0);
    assert_eq!(world.cell("Novice", 1, 2)?.as_deref(), Some("120"));

    world.add_stats_file("Pasu - 3.csv", "Pasu", 130.0)?;
    let report = sync_json(&world)?;
    assert_outcomes(
        &report,
        &[
            "skipped_already_processed",
            "skipped_already_processed",
            "written",
        ],
    )?;
    assert_eq!(report["files"][2]["previous_best"], 120.0);
    assert_eq!(world.cell("Novice", 1, 2)?.as_deref(), Some("130"));

    let bests = world.run(&["--format", "json", "bests"])?.json()?;
    assert_eq!(bests[0]["scenario"], "Pasu");
    assert_eq!(bests[0]["best_value"], 130.0);
    Ok(())
}

#[test]
fn test_second_sync_is_a_no_op() -> Result<()> {
    let world = benchmark_world();
    world.add_stats_file("a.csv", "Pasu", 80.0)?;
    world.add_stats_file("b.csv", "1wall6targets TE", 912.5)?;

    assert_written(&sync_json(&world)?, 2)?;
    let before = std::fs::read_to_string(world.worksheet_path("Novice"))?;

    let report = sync_json(&world)?;
    assert_written(&report, 0)?;
    assert_eq!(report["summary"]["already_processed"], 2);
    assert_eq!(std::fs::read_to_string(world.worksheet_path("Novice"))?, before);
    assert_eq!(world.cell("Novice", 2, 2)?.as_deref(), Some("912.5"));
    Ok(())
}

#[test]
fn test_unresolved_scenario_is_written_after_row_is_added() -> Result<()> {
    let world = benchmark_world();
    world.add_stats_file("gridshot.csv", "Gridshot", 98.0)?;

    let report = sync_json(&world)?;
    assert_outcomes(&report, &["skipped_unresolved_scenario"])?;

    world.write_worksheet(
        "Novice",
        &[
            &["Scenario", "Rank", "High Score"],
            &["Pasu", "", ""],
            &["1wall6targets TE", "", ""],
            &["Gridshot", "", ""],
        ],
    )?;

    let report = sync_json(&world)?;
    assert_outcomes(&report, &["written"])?;
    assert_eq!(world.cell("Novice", 3, 2)?.as_deref(), Some("98"));
    Ok(())
}

#[test]
fn test_worksheet_without_score_column_reports_unresolved_column() -> Result<()> {
    let world = TestWorld::new()
        .with_worksheet("Notes", &[&["Scenario", "Comment"], &["Pasu", "fun"]])
        .with_local_config();
    world.add_stats_file("pasu.csv", "Pasu", 50.0)?;

    let report = sync_json(&world)?;
    assert_outcomes(&report, &["skipped_unresolved_column"])?;
    assert_eq!(report["files"][0]["worksheet"], "Notes");
    Ok(())
}

#[test]
fn test_parse_failure_keeps_exit_code_zero() -> Result<()> {
    let world = benchmark_world();
    world.add_raw_stats_file("broken.csv", "Kills:,3\n")?;
    world.add_stats_file("ok.csv", "Pasu", 60.0)?;

    let report = sync_json(&world)?;
    assert_outcomes(&report, &["parse_failed", "written"])?;
    assert!(report["files"][0].get("scenario").is_none());
    assert_eq!(report["summary"]["parse_failed"], 1);
    Ok(())
}

#[test]
fn test_plain_output_lists_outcomes_and_summary() -> Result<()> {
    let world = benchmark_world();
    world.add_stats_file("Pasu.csv", "Pasu", 120.0)?;
    world.add_stats_file("Gridshot.csv", "Gridshot", 98.0)?;

    let result = world.run(&["sync"])?;
    assert!(result.success(), "sync failed: {}", result.stderr());

    let stdout = result.stdout();
    assert!(stdout.contains("120 -> 'Novice'!C2"), "stdout: {}", stdout);
    assert!(stdout.contains("[Pasu.csv]"), "stdout: {}", stdout);
    assert!(stdout.contains("scenario not found"), "stdout: {}", stdout);
    assert!(stdout.contains("2 files: 1 written"), "stdout: {}", stdout);
    Ok(())
}

#[test]
fn test_plain_output_hides_processed_files_unless_verbose() -> Result<()> {
    let world = benchmark_world();
    world.add_stats_file("Pasu.csv", "Pasu", 120.0)?;
    assert!(world.run(&["sync"])?.success());

    let result = world.run(&["sync"])?;
    assert!(result.success(), "sync failed: {}", result.stderr());
    let stdout = result.stdout();
    assert!(!stdout.contains("[Pasu.csv]"), "stdout: {}", stdout);
    assert!(stdout.contains("1 already processed"), "stdout: {}", stdout);

    let result = world.run(&["sync", "--verbose"])?;
    assert!(result.success(), "sync failed: {}", result.stderr());
    let stdout = result.stdout();
    assert!(stdout.contains("[Pasu.csv]"), "stdout: {}", stdout);
    assert!(stdout.contains("1 already processed"), "stdout: {}", stdout);
    Ok(())
}

#[test]
fn test_corrupt_state_is_reset_with_warning() -> Result<()> {
    let world = benchmark_world();
    std::fs::write(world.state_path(), vec![b'x'; 4096])?;
    world.add_stats_file("Pasu.csv", "Pasu", 120.0)?;

    let result = world.run(&["--format", "json", "sync"])?;
    assert!(result.success(), "sync failed: {}", result.stderr());
    assert!(
        result.stderr().contains("has been reset"),
        "stderr: {}",
        result.stderr()
    );
    assert_outcomes(&result.json()?, &["written"])?;
    Ok(())
}

#[test]
fn test_missing_stats_root_fails() -> Result<()> {
    let world = benchmark_world();
    std::fs::remove_dir_all(world.stats_root())?;

    let result = world.run(&["sync"])?;
    assert!(!result.success());
    assert!(result.stderr().contains("stats_root"), "stderr: {}", result.stderr());
    Ok(())
}

#[test]
fn test_import_legacy_state_raises_bests() -> Result<()> {
    let world = benchmark_world();
    let legacy = world.temp_dir().join("state.json");
    std::fs::write(
        &legacy,
        r#"{"scenarios": {"Pasu": {"best_score": 200}, "Gridshot": {"best_score": null}}, "processed_files": ["/old/Pasu.csv"]}"#,
    )?;

    let result = world.run(&["import-legacy", legacy.to_str().unwrap_or_default()])?;
    assert!(result.success(), "import failed: {}", result.stderr());
    assert!(result.stdout().contains("Imported 1"));

    world.add_stats_file("Pasu.csv", "Pasu", 150.0)?;
    let report = sync_json(&world)?;
    assert_outcomes(&report, &["skipped_not_improvement"])?;
    assert_eq!(report["files"][0]["best"], 200.0);
    Ok(())
}
