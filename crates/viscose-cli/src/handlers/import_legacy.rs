use anyhow::{Context, Result};
use std::path::Path;
use viscose_runtime::Workspace;
use viscose_store::import_legacy_state;

use super::surface_load_status;
use crate::types::OutputFormat;

pub fn handle(workspace: &Workspace, path: &Path, format: OutputFormat) -> Result<()> {
    let (mut store, status) = workspace.open_state()?;
    surface_load_status(&status);

    let summary = import_legacy_state(&mut store, path)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "imported": summary.imported,
                "kept": summary.kept,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Plain => {
            println!(
                "Imported {} personal bests ({} already at least as high locally)",
                summary.imported, summary.kept
            );
            println!("Processed-file history is not carried over; the first sync rescans every file.");
        }
    }
    Ok(())
}
