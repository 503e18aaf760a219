use clap::ValueEnum;
use log::LevelFilter;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned, optionally colored lines for a terminal
    Plain,
    /// Machine-readable JSON (one object per watch pass)
    Json,
}

/// Verbosity of diagnostics on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only failures that stop a command
    Error,
    /// Also skipped files and retried writes
    Warn,
    /// Also one line per sync pass
    Info,
    /// Also sheet indexing and state flushes
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
