//! Activity schema definition.
//!
//! # Invariants
//! - `(activity_name, email)` is unique, so a roster cannot repeat an email.
//! - `position` orders a roster by signup time.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written to `PRAGMA user_version` once tables exist.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS activities (
    name TEXT PRIMARY KEY NOT NULL,
    description TEXT NOT NULL,
    schedule TEXT NOT NULL,
    max_participants INTEGER NOT NULL CHECK (max_participants > 0)
);

CREATE TABLE IF NOT EXISTS activity_participants (
    activity_name TEXT NOT NULL REFERENCES activities(name) ON DELETE CASCADE,
    email TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (activity_name, email)
);

CREATE INDEX IF NOT EXISTS idx_activity_participants_position
    ON activity_participants (activity_name, position);
";

/// Creates the activity tables when missing and stamps the schema version.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;
    Ok(())
}

/// Reads the stamped schema version (0 for a fresh database).
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
