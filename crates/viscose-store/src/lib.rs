// Local state: best score per scenario plus the ledger of consumed exports.
// Single writer; staged in memory and persisted by `flush`.

mod db;
pub mod error;
mod legacy;
mod memory;
mod queries;
mod schema;
mod store;

pub use db::{LoadStatus, SqliteStateStore};
pub use error::{Error, Result};
pub use legacy::{ImportSummary, import_legacy_state};
pub use memory::MemoryStateStore;
pub use store::StateStore;
