use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use viscose_types::PersonalBestEntry;

use crate::{Error, Result};

pub fn upsert(conn: &Connection, entry: &PersonalBestEntry) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO best_scores (scenario, best_value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(scenario) DO UPDATE SET
            best_value = ?2,
            updated_at = ?3
        "#,
        params![
            &entry.scenario,
            entry.best_value,
            entry.last_updated_at.to_rfc3339()
        ],
    )?;

    Ok(())
}

pub fn get_all(conn: &Connection) -> Result<Vec<PersonalBestEntry>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT scenario, best_value, updated_at
        FROM best_scores
        ORDER BY scenario
        "#,
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(scenario, best_value, updated_at)| {
            let last_updated_at = DateTime::parse_from_rfc3339(&updated_at)
                .map_err(|e| {
                    Error::Corrupt(format!("invalid timestamp for '{}': {}", scenario, e))
                })?
                .with_timezone(&Utc);
            Ok(PersonalBestEntry {
                scenario,
                best_value,
                last_updated_at,
            })
        })
        .collect()
}
