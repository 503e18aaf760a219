use log::{info, warn};
use std::path::{Path, PathBuf};
use viscose_engine::SyncEngine;
use viscose_sheet::{GoogleSheetsTransport, LocalWorkbook, SheetTransport};
use viscose_store::{LoadStatus, SqliteStateStore};

use crate::config::{Config, SheetConfig, expand_tilde};
use crate::syncer::{SyncSource, Syncer};
use crate::{Error, Result};

const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.db";
const TOKEN_ENV: &str = "VISCOSE_ACCESS_TOKEN";

/// Syncer wired to the on-disk state and the configured sheet backend
pub type WorkspaceSyncer = Syncer<SqliteStateStore, Box<dyn SheetTransport>>;

/// A data directory holding `config.toml` and the state database
#[derive(Debug, Clone)]
pub struct Workspace {
    data_dir: PathBuf,
    config: Config,
}

impl Workspace {
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        let config = Config::load_from(&data_dir.join(CONFIG_FILE))?;
        Ok(Self { data_dir, config })
    }

    /// Write a config into `data_dir`; refuses to overwrite unless `force`.
    pub fn init(data_dir: PathBuf, config: Config, force: bool) -> Result<Self> {
        config.validate()?;

        let config_path = data_dir.join(CONFIG_FILE);
        if config_path.exists() && !force {
            return Err(Error::Config(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            )));
        }

        config.save_to(&config_path)?;
        info!("Wrote {}", config_path.display());
        Ok(Self { data_dir, config })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    pub fn open_state(&self) -> Result<(SqliteStateStore, LoadStatus)> {
        Ok(SqliteStateStore::open(&self.state_path())?)
    }

    /// Build the configured transport. Relative paths resolve against the data dir.
    pub fn connect_sheet(&self) -> Result<Box<dyn SheetTransport>> {
        match &self.config.sheet {
            SheetConfig::Google {
                spreadsheet_id,
                access_token_file,
            } => {
                let transport = match access_token_file {
                    Some(file) => {
                        GoogleSheetsTransport::from_token_file(spreadsheet_id, &self.resolve(file))?
                    }
                    None => {
                        let token = std::env::var(TOKEN_ENV).map_err(|_| {
                            Error::Config(format!(
                                "no access token: set sheet.access_token_file or {}",
                                TOKEN_ENV
                            ))
                        })?;
                        GoogleSheetsTransport::new(spreadsheet_id, token)?
                    }
                };
                Ok(Box::new(transport))
            }
            SheetConfig::Local { path } => Ok(Box::new(LocalWorkbook::open(self.resolve(path))?)),
        }
    }

    /// Open state and transport and assemble a syncer.
    pub fn syncer(&self) -> Result<(WorkspaceSyncer, LoadStatus)> {
        let source = SyncSource {
            stats_root: self.stats_root(),
            recursive: self.config.recursive,
            score_field: self.config.score_field.clone(),
        };
        if !source.stats_root.is_dir() {
            return Err(Error::Config(format!(
                "stats_root is not a readable directory: {}",
                source.stats_root.display()
            )));
        }

        let transport = self.connect_sheet()?;
        let (store, status) = self.open_state()?;
        if let LoadStatus::Recovered { backup, .. } = &status {
            warn!(
                "Previous state was unreadable and has been reset (backup: {})",
                backup.display()
            );
        }

        let engine = SyncEngine::new(store, transport, self.config.index_options()?);
        Ok((Syncer::new(engine, source), status))
    }

    pub fn stats_root(&self) -> PathBuf {
        self.resolve(&self.config.stats_root)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = match path.to_str() {
            Some(s) => expand_tilde(s),
            None => path.to_path_buf(),
        };
        if expanded.is_relative() {
            self.data_dir.join(expanded)
        } else {
            expanded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn local(stats: &Path, sheet: &Path) -> Config {
        Config::new(
            stats.to_path_buf(),
            SheetConfig::Local {
                path: sheet.to_path_buf(),
            },
        )
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() -> Result<()> {
        let temp = TempDir::new()?;
        let data_dir = temp.path().join("data");
        let config = local(temp.path(), temp.path());

        Workspace::init(data_dir.clone(), config.clone(), false)?;
        assert!(Workspace::init(data_dir.clone(), config.clone(), false).is_err());
        Workspace::init(data_dir.clone(), config, true)?;

        let ws = Workspace::open(data_dir)?;
        assert!(ws.config_path().exists());
        Ok(())
    }

    #[test]
    fn test_relative_paths_resolve_against_data_dir() -> Result<()> {
        let temp = TempDir::new()?;
        std::fs::create_dir_all(temp.path().join("sheet"))?;
        std::fs::create_dir_all(temp.path().join("stats"))?;

        let ws = Workspace::init(
            temp.path().to_path_buf(),
            local(Path::new("stats"), Path::new("sheet")),
            false,
        )?;
        assert_eq!(ws.stats_root(), temp.path().join("stats"));
        assert!(ws.connect_sheet().is_ok());
        Ok(())
    }

    #[test]
    fn test_missing_stats_root_is_fatal() -> Result<()> {
        let temp = TempDir::new()?;
        let ws = Workspace::init(
            temp.path().to_path_buf(),
            local(&temp.path().join("missing"), temp.path()),
            false,
        )?;
        assert!(matches!(ws.syncer(), Err(Error::Config(_))));
        Ok(())
    }

    #[test]
    fn test_google_backend_requires_token_file_to_exist() -> Result<()> {
        let temp = TempDir::new()?;
        let config = Config::new(
            temp.path().to_path_buf(),
            SheetConfig::Google {
                spreadsheet_id: "abc".to_string(),
                access_token_file: Some(temp.path().join("token.txt")),
            },
        );
        let ws = Workspace::init(temp.path().to_path_buf(), config, false)?;
        assert!(matches!(ws.connect_sheet(), Err(Error::Sheet(_))));
        Ok(())
    }
}
