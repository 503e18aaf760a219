// Stats exports are the source of truth; nothing here writes to disk.

mod discovery;
pub mod error;
mod parser;

pub use discovery::{StatsFile, discover_stats_files};
pub use error::{Error, Result};
pub use parser::{DEFAULT_SCORE_FIELD, parse_stats_file, parse_stats_reader};
