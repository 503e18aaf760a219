use anyhow::Result;
use viscose_runtime::Workspace;

use crate::types::OutputFormat;

/// Print the effective settings, with paths resolved and header phrases merged.
pub fn handle(workspace: &Workspace, format: OutputFormat) -> Result<()> {
    let config = workspace.config();

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "data_dir": workspace.data_dir(),
                "config_path": workspace.config_path(),
                "state_path": workspace.state_path(),
                "stats_root": workspace.stats_root(),
                "score_headers": config.score_phrases(),
                "watch_interval_secs": config.watch_interval().as_secs_f64(),
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Plain => {
            println!("# data_dir    = {}", workspace.data_dir().display());
            println!("# config      = {}", workspace.config_path().display());
            println!("# state       = {}", workspace.state_path().display());
            println!("# stats_root  = {}", workspace.stats_root().display());
            println!("# headers     = {}", config.score_phrases().join(", "));
            println!();
            print!("{}", toml::to_string_pretty(config)?);
        }
    }
    Ok(())
}
