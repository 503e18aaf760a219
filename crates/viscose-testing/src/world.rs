//! TestWorld pattern for declarative integration test setup.
//!
//! Provides a fluent interface for:
//! - Creating isolated test environments (stats root, data dir, local workbook)
//! - Placing stats exports with deterministic modification times
//! - Executing CLI commands with proper context

use anyhow::{Context, Result};
use assert_cmd::Command;
use filetime::{FileTime, set_file_mtime};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::{self, local_config_toml, read_worksheet, stats_csv, worksheet_csv};

/// First modification time handed out to stats files (2023-11-14)
const BASE_MTIME: i64 = 1_700_000_000;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use viscose_testing::TestWorld;
///
/// let world = TestWorld::new()
///     .with_worksheet("Novice", &[&["Scenario", "High Score"], &["Pasu", ""]])
///     .with_local_config();
/// world.add_stats_file("pasu-1.csv", "Pasu", 120.0).unwrap();
///
/// let result = world.run(&["sync"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    data_dir: PathBuf,
    stats_root: PathBuf,
    sheet_dir: PathBuf,
    env_vars: HashMap<String, String>,
    next_mtime: Cell<i64>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_path = temp_dir.path().to_path_buf();
        let data_dir = base_path.join(".viscose");
        let stats_root = base_path.join("stats");
        let sheet_dir = base_path.join("sheet");

        for dir in [&data_dir, &stats_root, &sheet_dir] {
            std::fs::create_dir_all(dir).expect("Failed to create test dir");
        }

        Self {
            temp_dir,
            data_dir,
            stats_root,
            sheet_dir,
            env_vars: HashMap::new(),
            next_mtime: Cell::new(BASE_MTIME),
        }
    }

    /// Get the data directory path (.viscose).
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the stats export directory.
    pub fn stats_root(&self) -> &Path {
        &self.stats_root
    }

    /// Get the local workbook directory.
    pub fn sheet_dir(&self) -> &Path {
        &self.sheet_dir
    }

    /// Get the temp directory root.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.db")
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Add a worksheet to the local workbook.
    pub fn with_worksheet(self, name: &str, rows: &[&[&str]]) -> Self {
        self.write_worksheet(name, rows)
            .expect("Failed to write worksheet");
        self
    }

    /// Write a config pointing at this world's stats root and workbook.
    pub fn with_local_config(self) -> Self {
        self.write_config(&local_config_toml(&self.stats_root, &self.sheet_dir))
            .expect("Failed to write config");
        self
    }

    /// Replace (or create) a worksheet of the local workbook.
    pub fn write_worksheet(&self, name: &str, rows: &[&[&str]]) -> Result<()> {
        fixtures::write_file(&self.worksheet_path(name), &worksheet_csv(rows))
    }

    pub fn write_config(&self, toml: &str) -> Result<()> {
        fixtures::write_file(&self.config_path(), toml)
    }

    /// Place a stats export under the stats root.
    ///
    /// Each call gets a later modification time than the previous one, so
    /// discovery order follows call order.
    pub fn add_stats_file(&self, name: &str, scenario: &str, score: f64) -> Result<PathBuf> {
        self.add_raw_stats_file(name, &stats_csv(scenario, score))
    }

    pub fn add_raw_stats_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.stats_root.join(name);
        fixtures::write_file(&path, contents)?;

        let mtime = self.next_mtime.get();
        self.next_mtime.set(mtime + 60);
        set_file_mtime(&path, FileTime::from_unix_time(mtime, 0))
            .with_context(|| format!("Failed to set mtime of {}", path.display()))?;
        Ok(path)
    }

    pub fn worksheet_path(&self, name: &str) -> PathBuf {
        self.sheet_dir.join(format!("{}.csv", name))
    }

    /// Text of a worksheet cell (0-based row and column), if present
    pub fn cell(&self, worksheet: &str, row: usize, col: usize) -> Result<Option<String>> {
        let rows = read_worksheet(&self.worksheet_path(worksheet))?;
        Ok(rows.get(row).and_then(|r| r.get(col)).cloned())
    }

    /// Configure a CLI command with this test environment's settings.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(self.data_dir());

        cmd.current_dir(self.temp_dir.path());
        cmd.env_remove("VISCOSE_PATH");
        cmd.env_remove("VISCOSE_ACCESS_TOKEN");
        cmd.env_remove("RUST_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Arguments that point a raw `std::process::Command` at this world.
    pub fn base_args(&self) -> Vec<String> {
        vec![
            "--data-dir".to_string(),
            self.data_dir.display().to_string(),
        ]
    }

    /// Execute a command using the project's binary and return the result.
    ///
    /// # Note
    /// This method uses `Command::cargo_bin()` which requires the binary to be
    /// built and the `CARGO_BIN_EXE_` environment variable to be set (which
    /// cargo test does automatically).
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("viscose")
            .map_err(|e| anyhow::anyhow!("Failed to find viscose binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    /// Get stdout as a string.
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Get stderr as a string.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
