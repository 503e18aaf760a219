//! One-shot and watch orchestration over real stats files
//!
//! Stats exports live in a TestWorld stats root; the sheet and state are
//! in-memory doubles unless a test is about persistence.

use filetime::{FileTime, set_file_mtime};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;
use viscose_engine::{IndexOptions, SyncEngine};
use viscose_runtime::{
    CancellationToken, DEFAULT_SCORE_HEADERS, IntervalPacer, Pacer, SyncSource, Syncer, Wake,
};
use viscose_sheet::MemorySheet;
use viscose_store::{MemoryStateStore, SqliteStateStore, StateStore};
use viscose_testing::TestWorld;
use viscose_testing::fixtures::stats_csv_without_score;
use viscose_types::{CellRef, OutcomeKind, SyncReport};

fn benchmark_sheet() -> MemorySheet {
    MemorySheet::new().with_worksheet(
        "Novice",
        vec![
            vec!["Scenario", "Rank", "High Score"],
            vec!["Pasu", "", ""],
            vec!["1wall6targets TE", "", ""],
        ],
    )
}

fn syncer<S: StateStore>(world: &TestWorld, store: S, sheet: MemorySheet) -> Syncer<S, MemorySheet> {
    let options = IndexOptions {
        score_headers: DEFAULT_SCORE_HEADERS.iter().map(|s| s.to_string()).collect(),
        ..IndexOptions::default()
    };
    Syncer::new(
        SyncEngine::new(store, sheet, options),
        SyncSource {
            stats_root: world.stats_root().to_path_buf(),
            recursive: true,
            score_field: "Score".to_string(),
        },
    )
}

fn kinds(report: &SyncReport) -> Vec<OutcomeKind> {
    report.files.iter().map(|f| f.outcome.kind()).collect()
}

/// Pacer that runs one scripted step per pause and cancels when out of steps.
struct ScriptedPacer<'a> {
    steps: VecDeque<Box<dyn FnMut() -> Wake + 'a>>,
    pauses: usize,
}

impl<'a> ScriptedPacer<'a> {
    fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            pauses: 0,
        }
    }

    fn then(mut self, step: impl FnMut() -> Wake + 'a) -> Self {
        self.steps.push_back(Box::new(step));
        self
    }
}

impl Pacer for ScriptedPacer<'_> {
    fn pause(&mut self, _cancel: &CancellationToken) -> Wake {
        self.pauses += 1;
        match self.steps.pop_front() {
            Some(mut step) => step(),
            None => Wake::Cancelled,
        }
    }
}

#[test]
fn test_run_once_writes_improvements_in_file_order() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let sheet = benchmark_sheet();
    let mut syncer = syncer(&world, MemoryStateStore::new(), sheet.clone());

    world.add_stats_file("Pasu - 1.csv", "Pasu", 120.0)?;
    world.add_stats_file("Pasu - 2.csv", "Pasu", 115.0)?;

    let report = syncer.run_once()?;
    assert_eq!(
        kinds(&report),
        vec![OutcomeKind::Written, OutcomeKind::SkippedNotImprovement]
    );
    assert_eq!(report.files[0].scenario.as_deref(), Some("Pasu"));

    world.add_stats_file("Pasu - 3.csv", "Pasu", 130.0)?;
    let report = syncer.run_once()?;
    assert_eq!(
        kinds(&report),
        vec![
            OutcomeKind::SkippedAlreadyProcessed,
            OutcomeKind::SkippedAlreadyProcessed,
            OutcomeKind::Written
        ]
    );

    let writes = sheet.writes();
    assert_eq!(writes.len(), 2);
    assert!(writes.iter().all(|w| w.cell == CellRef::new(1, 2)));
    assert_eq!(sheet.cell("Novice", CellRef::new(1, 2)).as_deref(), Some("130"));
    Ok(())
}

#[test]
fn test_second_run_on_unchanged_inputs_is_idempotent() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let sheet = benchmark_sheet();
    let mut syncer = syncer(&world, MemoryStateStore::new(), sheet.clone());

    world.add_stats_file("a.csv", "Pasu", 80.0)?;
    world.add_stats_file("b.csv", "1wall6targets TE", 900.0)?;

    assert_eq!(syncer.run_once()?.summary().written, 2);
    let second = syncer.run_once()?;

    assert_eq!(second.summary().written, 0);
    assert_eq!(second.summary().already_processed, 2);
    assert_eq!(sheet.writes().len(), 2);
    assert_eq!(sheet.listing_count(), 1, "no write needed, so no sheet read");
    Ok(())
}

/// Overwrite a file with unparseable bytes while keeping its size and mtime,
/// so its signature (and ledger identity) stays the same.
fn scramble_in_place(path: &Path) -> anyhow::Result<()> {
    let metadata = std::fs::metadata(path)?;
    let len = usize::try_from(metadata.len())?;
    std::fs::write(path, vec![b'#'; len])?;
    set_file_mtime(path, FileTime::from_last_modification_time(&metadata))?;
    Ok(())
}

#[test]
fn test_processed_file_is_not_read_again() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let sheet = benchmark_sheet();
    let mut syncer = syncer(&world, MemoryStateStore::new(), sheet.clone());

    let path = world.add_stats_file("Pasu.csv", "Pasu", 120.0)?;
    assert_eq!(kinds(&syncer.run_once()?), vec![OutcomeKind::Written]);

    scramble_in_place(&path)?;
    let report = syncer.run_once()?;

    assert_eq!(kinds(&report), vec![OutcomeKind::SkippedAlreadyProcessed]);
    assert_eq!(report.summary().parse_failed, 0);
    assert_eq!(sheet.writes().len(), 1);
    Ok(())
}

#[test]
fn test_parse_failure_is_retried_once_fixed() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let sheet = benchmark_sheet();
    let mut syncer = syncer(&world, MemoryStateStore::new(), sheet.clone());

    world.add_raw_stats_file("Pasu.csv", &stats_csv_without_score("Pasu"))?;
    let report = syncer.run_once()?;
    assert_eq!(kinds(&report), vec![OutcomeKind::ParseFailed]);
    assert_eq!(report.files[0].scenario, None);
    assert_eq!(syncer.engine().store().processed_count(), 0);

    world.add_stats_file("Pasu.csv", "Pasu", 101.0)?;
    let report = syncer.run_once()?;
    assert_eq!(kinds(&report), vec![OutcomeKind::Written]);
    assert_eq!(syncer.engine().store().processed_count(), 1);
    Ok(())
}

#[test]
fn test_missing_stats_root_fails_run() {
    let world = TestWorld::new();
    std::fs::remove_dir_all(world.stats_root()).unwrap();
    let mut syncer = syncer(&world, MemoryStateStore::new(), benchmark_sheet());

    assert!(syncer.run_once().is_err());
}

#[test]
fn test_watch_cancelled_up_front_runs_no_ticks() -> anyhow::Result<()> {
    let world = TestWorld::new();
    world.add_stats_file("a.csv", "Pasu", 80.0)?;
    let sheet = benchmark_sheet();
    let mut syncer = syncer(&world, MemoryStateStore::new(), sheet.clone());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut pacer = ScriptedPacer::new();
    let mut reports = 0;

    let ticks = syncer.run_watch(&cancel, &mut pacer, |_| reports += 1)?;

    assert_eq!(ticks, 0);
    assert_eq!(reports, 0);
    assert_eq!(pacer.pauses, 0);
    assert!(sheet.writes().is_empty());
    assert_eq!(syncer.engine().store().flush_count(), 1);
    Ok(())
}

#[test]
fn test_watch_retries_unresolved_and_skips_settled_files() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let sheet = benchmark_sheet();
    let mut syncer = syncer(&world, MemoryStateStore::new(), sheet.clone());

    world.add_stats_file("Pasu.csv", "Pasu", 120.0)?;
    world.add_stats_file("Gridshot.csv", "Gridshot", 98.0)?;

    let mut pacer = ScriptedPacer::new()
        .then(|| {
            sheet.push_row("Novice", ["Gridshot", "", ""]);
            Wake::Timeout
        })
        .then(|| {
            world
                .add_stats_file("Pasu 2.csv", "Pasu", 130.0)
                .expect("write stats file");
            Wake::Changed
        })
        .then(|| Wake::Timeout);

    let mut reports: Vec<Vec<OutcomeKind>> = Vec::new();
    let ticks = syncer.run_watch(&CancellationToken::new(), &mut pacer, |report| {
        reports.push(kinds(report))
    })?;

    assert_eq!(ticks, 4);
    assert_eq!(
        reports,
        vec![
            vec![OutcomeKind::Written, OutcomeKind::SkippedUnresolvedScenario],
            vec![OutcomeKind::Written],
            vec![OutcomeKind::Written],
            vec![],
        ]
    );
    let values: Vec<f64> = sheet.writes().iter().map(|w| w.value).collect();
    assert_eq!(values, vec![120.0, 98.0, 130.0]);
    Ok(())
}

#[test]
fn test_watch_parse_failure_waits_for_file_change() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let mut syncer = syncer(&world, MemoryStateStore::new(), benchmark_sheet());
    world.add_raw_stats_file("Pasu.csv", "garbage\n")?;

    let mut pacer = ScriptedPacer::new()
        .then(|| Wake::Timeout)
        .then(|| {
            world
                .add_stats_file("Pasu.csv", "Pasu", 50.0)
                .expect("rewrite stats file");
            Wake::Changed
        });

    let mut reports: Vec<Vec<OutcomeKind>> = Vec::new();
    syncer.run_watch(&CancellationToken::new(), &mut pacer, |report| {
        reports.push(kinds(report))
    })?;

    assert_eq!(
        reports,
        vec![
            vec![OutcomeKind::ParseFailed],
            vec![],
            vec![OutcomeKind::Written]
        ]
    );
    Ok(())
}

#[test]
fn test_watch_transport_failure_is_retried_next_tick() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let sheet = benchmark_sheet();
    sheet.fail_next_writes(1);
    let mut syncer = syncer(&world, MemoryStateStore::new(), sheet.clone());
    world.add_stats_file("Pasu.csv", "Pasu", 120.0)?;

    let mut pacer = ScriptedPacer::new().then(|| Wake::Timeout);
    let mut reports: Vec<Vec<OutcomeKind>> = Vec::new();
    syncer.run_watch(&CancellationToken::new(), &mut pacer, |report| {
        reports.push(kinds(report))
    })?;

    assert_eq!(
        reports,
        vec![vec![OutcomeKind::TransportFailed], vec![OutcomeKind::Written]]
    );
    assert_eq!(sheet.writes().len(), 1);
    Ok(())
}

#[test]
fn test_watch_flushes_state_before_returning() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let state_path = world.data_dir().join("state.db");
    let (mut store, _) = SqliteStateStore::open(&state_path)?;
    store.record_best("Pasu", 200.0, chrono::Utc::now());
    store.flush()?;

    let mut syncer = syncer(&world, store, benchmark_sheet());
    world.add_stats_file("Pasu.csv", "Pasu", 100.0)?;

    let cancel = CancellationToken::new();
    let remote = cancel.clone();
    let mut pacer = IntervalPacer::new(Duration::from_millis(10));
    let mut seen = 0;
    let ticks = syncer.run_watch(&cancel, &mut pacer, |report| {
        seen += report.files.len();
        remote.cancel();
    })?;
    assert_eq!(ticks, 1);
    assert_eq!(seen, 1);

    // Read through a second handle while the syncer still owns the first.
    let (reader, _) = SqliteStateStore::open(&state_path)?;
    assert_eq!(reader.processed_count(), 1);
    assert_eq!(reader.get_best("Pasu"), Some(200.0));
    drop(syncer);
    Ok(())
}

#[test]
fn test_watch_forgets_deleted_files() -> anyhow::Result<()> {
    let world = TestWorld::new();
    let mut syncer = syncer(&world, MemoryStateStore::new(), benchmark_sheet());
    let path = world.add_stats_file("Pasu.csv", "Pasu", 120.0)?;
    let contents = std::fs::read(&path)?;
    let mtime = FileTime::from_last_modification_time(&std::fs::metadata(&path)?);

    let mut pacer = ScriptedPacer::new()
        .then(|| {
            std::fs::remove_file(&path).expect("remove stats file");
            Wake::Changed
        })
        .then(|| {
            // Same bytes and mtime: identical signature to the first sighting.
            std::fs::write(&path, &contents).expect("restore stats file");
            set_file_mtime(&path, mtime).expect("restore mtime");
            Wake::Changed
        });

    let mut reports: Vec<Vec<OutcomeKind>> = Vec::new();
    syncer.run_watch(&CancellationToken::new(), &mut pacer, |report| {
        reports.push(kinds(report))
    })?;

    assert_eq!(
        reports,
        vec![
            vec![OutcomeKind::Written],
            vec![],
            vec![OutcomeKind::SkippedAlreadyProcessed],
        ]
    );
    Ok(())
}
