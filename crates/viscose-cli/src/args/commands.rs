use clap::{ArgGroup, Args, Subcommand};

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Write a config for a stats folder and a spreadsheet")]
    Init(InitArgs),

    #[command(about = "Sync every stats export once and exit")]
    Sync {
        /// Also list exports that were already processed
        #[arg(long, short)]
        verbose: bool,
    },

    #[command(about = "Keep syncing new stats exports until Ctrl+C")]
    Watch,

    #[command(about = "List recorded personal bests")]
    Bests,

    #[command(about = "Show the resolved configuration")]
    Config,

    #[command(about = "Import best scores from a legacy state.json")]
    ImportLegacy {
        /// Path to the legacy state file
        path: String,
    },
}

#[derive(Debug, Clone, Args)]
#[command(group(
    ArgGroup::new("backend")
        .required(true)
        .args(["sheet_id", "local"]),
))]
pub struct InitArgs {
    /// Folder KovaaK's writes stats exports to
    #[arg(long)]
    pub stats_root: String,

    /// Google Sheets spreadsheet id
    #[arg(long)]
    pub sheet_id: Option<String>,

    /// File holding a Sheets API bearer token
    #[arg(long, requires = "sheet_id", conflicts_with = "local")]
    pub token_file: Option<String>,

    /// Directory of `<worksheet>.csv` files to use instead of Google Sheets
    #[arg(long)]
    pub local: Option<String>,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}
