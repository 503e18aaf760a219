use env_logger::{Builder, Target};

use crate::types::LogLevel;

/// Route the `log` facade to stderr. `RUST_LOG` directives override `--log-level`.
pub fn init(level: LogLevel) {
    // A second init (only possible in tests) keeps the first logger.
    let _ = Builder::new()
        .filter_level(level.into())
        .parse_default_env()
        .target(Target::Stderr)
        .format_timestamp(None)
        .try_init();
}
