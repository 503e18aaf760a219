use rusqlite::Connection;

use crate::{Error, Result};

// Schema version (increment when changing table definitions)
pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    // Unlike a rebuildable index, this data cannot be regenerated, so an
    // unknown version is reported instead of dropped.
    if current_version != 0 && current_version != SCHEMA_VERSION {
        return Err(Error::Corrupt(format!(
            "unsupported schema version {} (expected {})",
            current_version, SCHEMA_VERSION
        )));
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS best_scores (
            scenario TEXT PRIMARY KEY,
            best_value REAL NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS processed_files (
            source_id TEXT PRIMARY KEY,
            processed_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}
