use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use viscose_types::SourceFileId;

use crate::Result;

pub fn insert(conn: &Connection, id: &SourceFileId, processed_at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        r#"
        INSERT OR IGNORE INTO processed_files (source_id, processed_at)
        VALUES (?1, ?2)
        "#,
        params![id.as_str(), processed_at.to_rfc3339()],
    )?;

    Ok(())
}

pub fn get_all_ids(conn: &Connection) -> Result<Vec<SourceFileId>> {
    let mut stmt = conn.prepare("SELECT source_id FROM processed_files")?;

    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .map(|id| id.map(SourceFileId::new))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(ids)
}
