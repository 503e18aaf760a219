mod args;
mod commands;
mod handlers;
mod logging;
pub mod types;
mod views;

pub use args::{Cli, Commands, InitArgs};
pub use commands::run;
pub use types::{LogLevel, OutputFormat};
