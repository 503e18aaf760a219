use anyhow::Result;
use log::warn;
use std::collections::HashMap;
use std::path::PathBuf;
use viscose_runtime::{CancellationToken, ChannelPacer, IntervalPacer, Pacer, Workspace};
use viscose_types::{OutcomeKind, SyncReport};

use super::{report_json, surface_load_status};
use crate::types::OutputFormat;
use crate::views::{self, FileLineView, SummaryView};

pub fn handle(workspace: &Workspace, format: OutputFormat) -> Result<()> {
    let (mut syncer, status) = workspace.syncer()?;
    surface_load_status(&status);

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    let root = workspace.stats_root();
    let config = workspace.config();
    let interval = config.watch_interval();

    let mut pacer: Box<dyn Pacer> =
        match ChannelPacer::new(&root, config.recursive, interval, &cancel) {
            Ok(pacer) => Box::new(pacer),
            Err(e) => {
                warn!("File watcher unavailable ({}); polling every {:?}", e, interval);
                Box::new(IntervalPacer::new(interval))
            }
        };

    let color = views::use_color();
    let mut last_shown: HashMap<PathBuf, OutcomeKind> = HashMap::new();
    if format == OutputFormat::Plain {
        println!("Watching {} (Ctrl+C to stop)", root.display());
    }

    let ticks = syncer.run_watch(&cancel, pacer.as_mut(), |report: &SyncReport| {
        // Quiet ticks print nothing.
        if report.files.is_empty() {
            return;
        }
        match format {
            OutputFormat::Json => match serde_json::to_string(&report_json(report)) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize report: {}", e),
            },
            OutputFormat::Plain => {
                // Unresolved files come back every tick; repeat them only when the outcome changes.
                let mut printed = 0;
                for file in &report.files {
                    let kind = file.outcome.kind();
                    let repeated = last_shown.insert(file.path.clone(), kind) == Some(kind);
                    if repeated && !file.outcome.is_settled() {
                        continue;
                    }
                    println!("{}", FileLineView::new(file, &root, color));
                    printed += 1;
                }
                if printed > 0 {
                    println!("{}", SummaryView::new(report.files.len(), report.summary(), color));
                }
            }
        }
    })?;

    if format == OutputFormat::Plain {
        println!("Stopped after {} sync passes", ticks);
    }
    Ok(())
}
