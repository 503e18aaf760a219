pub mod cancel;
pub mod config;
pub mod error;
pub mod pacer;
pub mod syncer;
pub mod workspace;

pub use cancel::CancellationToken;
pub use config::{Config, DEFAULT_SCORE_HEADERS, SheetConfig, expand_tilde, resolve_workspace_path};
pub use error::{Error, Result};
pub use pacer::{ChannelPacer, IntervalPacer, Pacer, Wake};
pub use syncer::{SyncSource, Syncer};
pub use workspace::{Workspace, WorkspaceSyncer};
