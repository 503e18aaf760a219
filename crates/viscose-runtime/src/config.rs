use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use viscose_engine::IndexOptions;
use viscose_sheet::ScanColumns;

/// Score header phrases tried after the user's own, in this order
pub const DEFAULT_SCORE_HEADERS: [&str; 4] = ["High Score", "Your Score", "Score", "PB"];

const DEFAULT_POLL_INTERVAL_SECS: f64 = 5.0;
const MIN_WATCH_INTERVAL_SECS: f64 = 1.0;

/// Resolve the workspace data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. VISCOSE_PATH environment variable (with tilde expansion)
/// 3. XDG data directory (recommended default)
/// 4. ~/.viscose (fallback for systems without XDG)
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("VISCOSE_PATH")
        && !env_path.trim().is_empty()
    {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("viscose"));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".viscose"));
    }

    Err(Error::Config(
        "Could not determine workspace path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// Where personal bests are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum SheetConfig {
    /// Google Sheets spreadsheet
    Google {
        spreadsheet_id: String,
        /// File holding an OAuth bearer token; `VISCOSE_ACCESS_TOKEN` is used when unset
        #[serde(default, skip_serializing_if = "Option::is_none")]
        access_token_file: Option<PathBuf>,
    },
    /// Directory of `<worksheet>.csv` files
    Local { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub stats_root: PathBuf,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: f64,

    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Key-value label whose value is the run's score
    #[serde(default = "default_score_field")]
    pub score_field: String,

    /// Extra header phrases, tried before the defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub score_headers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worksheet_filter: Option<Vec<String>>,

    #[serde(default = "default_scan_columns")]
    pub scan_columns: String,

    pub sheet: SheetConfig,
}

fn default_poll_interval() -> f64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_true() -> bool {
    true
}

fn default_score_field() -> String {
    viscose_stats::DEFAULT_SCORE_FIELD.to_string()
}

fn default_scan_columns() -> String {
    "A".to_string()
}

impl Config {
    pub fn new(stats_root: PathBuf, sheet: SheetConfig) -> Self {
        Self {
            stats_root,
            poll_interval_secs: default_poll_interval(),
            recursive: true,
            score_field: default_score_field(),
            score_headers: Vec::new(),
            worksheet_filter: None,
            scan_columns: default_scan_columns(),
            sheet,
        }
    }

    /// Load and validate a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotInitialized(format!(
                "no config at {} (run `viscose init`)",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.stats_root.as_os_str().is_empty() {
            return Err(Error::Config("stats_root must not be empty".to_string()));
        }
        if !self.poll_interval_secs.is_finite() || self.poll_interval_secs <= 0.0 {
            return Err(Error::Config(format!(
                "poll_interval_secs must be a positive number, got {}",
                self.poll_interval_secs
            )));
        }
        if self.score_field.trim().is_empty() {
            return Err(Error::Config("score_field must not be empty".to_string()));
        }
        if let Some(filter) = &self.worksheet_filter
            && filter.iter().all(|name| name.trim().is_empty())
        {
            return Err(Error::Config(
                "worksheet_filter must name at least one worksheet".to_string(),
            ));
        }
        self.scan()?;

        match &self.sheet {
            SheetConfig::Google { spreadsheet_id, .. } if spreadsheet_id.trim().is_empty() => {
                Err(Error::Config("sheet.spreadsheet_id must not be empty".to_string()))
            }
            SheetConfig::Local { path } if path.as_os_str().is_empty() => {
                Err(Error::Config("sheet.path must not be empty".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// User phrases followed by the defaults, deduplicated case-insensitively
    pub fn score_phrases(&self) -> Vec<String> {
        let mut phrases: Vec<String> = Vec::new();
        let candidates = self
            .score_headers
            .iter()
            .map(String::as_str)
            .chain(DEFAULT_SCORE_HEADERS);

        for candidate in candidates {
            let candidate = candidate.trim();
            if candidate.is_empty()
                || phrases.iter().any(|p| p.eq_ignore_ascii_case(candidate))
            {
                continue;
            }
            phrases.push(candidate.to_string());
        }
        phrases
    }

    pub fn scan(&self) -> Result<ScanColumns> {
        self.scan_columns
            .parse()
            .map_err(|e: viscose_sheet::Error| Error::Config(e.to_string()))
    }

    /// Pause between watch ticks (never below one second)
    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_secs.max(MIN_WATCH_INTERVAL_SECS))
    }

    pub fn index_options(&self) -> Result<IndexOptions> {
        Ok(IndexOptions {
            score_headers: self.score_phrases(),
            worksheet_filter: self.worksheet_filter.clone(),
            scan_columns: self.scan()?,
        })
    }
}
