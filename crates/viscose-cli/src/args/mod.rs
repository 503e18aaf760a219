mod commands;

pub use commands::*;

use clap::Parser;

use crate::types::{LogLevel, OutputFormat};

#[derive(Parser)]
#[command(name = "viscose")]
#[command(about = "Sync KovaaK's personal bests into a benchmark spreadsheet", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (default: $VISCOSE_PATH, then the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_backends_are_exclusive() {
        let both = Cli::try_parse_from([
            "viscose", "init", "--stats-root", "s", "--sheet-id", "x", "--local", "d",
        ]);
        assert!(both.is_err());

        let token_without_sheet = Cli::try_parse_from([
            "viscose", "init", "--stats-root", "s", "--local", "d", "--token-file", "t",
        ]);
        assert!(token_without_sheet.is_err());

        let cli = Cli::try_parse_from([
            "viscose", "--format", "json", "init", "--stats-root", "s", "--local", "d",
        ])
        .expect("valid init");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Some(Commands::Init(InitArgs { local: Some(_), .. }))
        ));
    }

    #[test]
    fn test_sync_verbose_flag() {
        let cli = Cli::try_parse_from(["viscose", "sync"]).expect("plain sync");
        assert!(matches!(cli.command, Some(Commands::Sync { verbose: false })));

        let cli = Cli::try_parse_from(["viscose", "sync", "-v"]).expect("verbose sync");
        assert!(matches!(cli.command, Some(Commands::Sync { verbose: true })));
    }
}
