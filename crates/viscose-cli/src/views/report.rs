use owo_colors::OwoColorize;
use std::fmt;
use std::path::Path;
use viscose_types::{FileReport, OutcomeKind, SyncOutcome, SyncSummary, format_score};

const LABEL_WIDTH: usize = 22;

/// One outcome line: label, scenario, detail and the file (relative to the stats root)
pub struct FileLineView<'a> {
    file: &'a FileReport,
    root: &'a Path,
    color: bool,
}

impl<'a> FileLineView<'a> {
    pub fn new(file: &'a FileReport, root: &'a Path, color: bool) -> Self {
        Self { file, root, color }
    }

    fn detail(&self) -> String {
        match &self.file.outcome {
            SyncOutcome::Written {
                target,
                value,
                previous_best,
            } => match previous_best {
                Some(prev) => format!(
                    "{} -> {} (was {})",
                    format_score(*value),
                    target,
                    format_score(*prev)
                ),
                None => format!("{} -> {}", format_score(*value), target),
            },
            SyncOutcome::SkippedNotImprovement { best } => {
                format!("best is {}", format_score(*best))
            }
            SyncOutcome::SkippedUnresolvedColumn { worksheet } => {
                format!("no score column in '{}'", worksheet)
            }
            SyncOutcome::ParseFailed { reason } | SyncOutcome::TransportFailed { reason } => {
                reason.clone()
            }
            SyncOutcome::SkippedAlreadyProcessed | SyncOutcome::SkippedUnresolvedScenario => {
                String::new()
            }
        }
    }
}

impl fmt::Display for FileLineView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.file.outcome.kind();
        let label = format!("{:<width$}", kind.label(), width = LABEL_WIDTH);
        let path = self.file.path.strip_prefix(self.root).unwrap_or(&self.file.path);
        let scenario = self.file.scenario.as_deref().unwrap_or("-");
        let detail = self.detail();

        if self.color {
            match kind {
                OutcomeKind::Written => write!(f, "{}", label.green())?,
                OutcomeKind::SkippedAlreadyProcessed | OutcomeKind::SkippedNotImprovement => {
                    write!(f, "{}", label.dimmed())?
                }
                OutcomeKind::SkippedUnresolvedScenario | OutcomeKind::SkippedUnresolvedColumn => {
                    write!(f, "{}", label.yellow())?
                }
                OutcomeKind::ParseFailed | OutcomeKind::TransportFailed => {
                    write!(f, "{}", label.red())?
                }
            }
            write!(f, " {}", scenario.bold())?;
        } else {
            write!(f, "{} {}", label, scenario)?;
        }

        if !detail.is_empty() {
            write!(f, "  {}", detail)?;
        }

        if self.color {
            write!(f, "  {}", path.display().dimmed())
        } else {
            write!(f, "  [{}]", path.display())
        }
    }
}

pub struct SummaryView {
    total: usize,
    summary: SyncSummary,
    color: bool,
}

impl SummaryView {
    pub fn new(total: usize, summary: SyncSummary, color: bool) -> Self {
        Self {
            total,
            summary,
            color,
        }
    }
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        let failed = s.parse_failed + s.transport_failed;
        let written = format!("{} written", s.written);

        write!(f, "{} files: ", self.total)?;
        if self.color && s.written > 0 {
            write!(f, "{}", written.green().bold())?;
        } else {
            write!(f, "{}", written)?;
        }
        write!(
            f,
            ", {} already processed, {} not improvements, {} unresolved",
            s.already_processed, s.not_improvement, s.unresolved
        )?;

        let failed = format!("{} failed", failed);
        if self.color && s.parse_failed + s.transport_failed > 0 {
            write!(f, ", {}", failed.red())
        } else {
            write!(f, ", {}", failed)
        }
    }
}
