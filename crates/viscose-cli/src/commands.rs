use anyhow::Result;
use std::path::Path;
use viscose_runtime::{Workspace, resolve_workspace_path};

use super::args::{Cli, Commands};
use super::handlers;
use crate::logging;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let data_dir = resolve_workspace_path(cli.data_dir.as_deref())?;

    let Some(command) = cli.command else {
        show_guidance(&data_dir);
        return Ok(());
    };

    match command {
        Commands::Init(args) => handlers::init::handle(data_dir, args, cli.format),

        Commands::Sync { verbose } => {
            let workspace = Workspace::open(data_dir)?;
            handlers::sync::handle(&workspace, cli.format, verbose)
        }

        Commands::Watch => {
            let workspace = Workspace::open(data_dir)?;
            handlers::watch::handle(&workspace, cli.format)
        }

        Commands::Bests => {
            let workspace = Workspace::open(data_dir)?;
            handlers::bests::handle(&workspace, cli.format)
        }

        Commands::Config => {
            let workspace = Workspace::open(data_dir)?;
            handlers::config::handle(&workspace, cli.format)
        }

        Commands::ImportLegacy { path } => {
            let workspace = Workspace::open(data_dir)?;
            handlers::import_legacy::handle(&workspace, Path::new(&path), cli.format)
        }
    }
}

fn show_guidance(data_dir: &Path) {
    let config_path = data_dir.join("config.toml");

    if config_path.exists() {
        println!("viscose is configured ({}).", config_path.display());
        println!();
        println!("  viscose sync     push new personal bests once");
        println!("  viscose watch    keep syncing until Ctrl+C");
        println!("  viscose bests    list recorded personal bests");
    } else {
        println!("viscose is not configured yet.");
        println!();
        println!("  viscose init --stats-root <dir> --sheet-id <spreadsheet id>");
        println!("  viscose init --stats-root <dir> --local <dir of worksheet csv files>");
    }
}
