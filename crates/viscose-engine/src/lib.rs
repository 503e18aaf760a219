// Engine module - per-record sync decisions
// Sits between parsed stats records (stats) and the sheet/state side effects

mod decision;
mod engine;
pub mod error;

pub use decision::{Decision, evaluate};
pub use engine::{IndexOptions, SyncEngine};
pub use error::{Error, Result};
