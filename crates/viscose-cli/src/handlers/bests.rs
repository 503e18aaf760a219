use anyhow::Result;
use viscose_runtime::Workspace;
use viscose_store::StateStore;

use super::surface_load_status;
use crate::types::OutputFormat;
use crate::views::{self, BestsView};

pub fn handle(workspace: &Workspace, format: OutputFormat) -> Result<()> {
    let (store, status) = workspace.open_state()?;
    surface_load_status(&status);

    let bests = store.bests();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bests)?),
        OutputFormat::Plain => print!("{}", BestsView::new(&bests, views::use_color())),
    }
    Ok(())
}
