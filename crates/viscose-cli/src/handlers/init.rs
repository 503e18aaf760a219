use anyhow::{Context, Result};
use std::path::PathBuf;
use viscose_runtime::{Config, SheetConfig, Workspace, expand_tilde};

use crate::args::InitArgs;
use crate::types::OutputFormat;

pub fn handle(data_dir: PathBuf, args: InitArgs, format: OutputFormat) -> Result<()> {
    let stats_root = absolute(&args.stats_root)?;

    let sheet = match (args.sheet_id, args.local) {
        (Some(spreadsheet_id), _) => SheetConfig::Google {
            spreadsheet_id,
            access_token_file: args.token_file.as_deref().map(absolute).transpose()?,
        },
        (None, Some(local)) => SheetConfig::Local {
            path: absolute(&local)?,
        },
        (None, None) => anyhow::bail!("either --sheet-id or --local is required"),
    };

    if !stats_root.is_dir() {
        eprintln!(
            "Warning: {} does not exist yet; sync will fail until it does",
            stats_root.display()
        );
    }

    let workspace = Workspace::init(data_dir, Config::new(stats_root, sheet), args.force)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "config_path": workspace.config_path(),
                "config": workspace.config(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Plain => {
            println!("Wrote {}", workspace.config_path().display());
            println!("Edit it to add score_headers or a worksheet_filter, then run `viscose sync`.");
        }
    }
    Ok(())
}

/// Paths typed on the command line are relative to where the user stands,
/// not to the data directory.
fn absolute(raw: &str) -> Result<PathBuf> {
    let path = expand_tilde(raw);
    std::path::absolute(&path).with_context(|| format!("Failed to resolve path {}", raw))
}
