//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure the busy timeout that bounds lock waits.
//! - Create the schema before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have the activity schema in place.

use super::schema::ensure_schema;
use super::DbResult;
use crate::config::{StorageConfig, DEFAULT_BUSY_TIMEOUT_MS};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file with the default busy timeout.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with_timeout(path, Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))
}

/// Opens the database described by `config`.
pub fn open_storage(config: &StorageConfig) -> DbResult<Connection> {
    open_db_with_timeout(&config.database_path, config.busy_timeout())
}

/// Opens a SQLite database file and waits at most `busy_timeout` for locks.
///
/// # Side effects
/// - Creates the file and schema when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_with_timeout(
    path: impl AsRef<Path>,
    busy_timeout: Duration,
) -> DbResult<Connection> {
    open_logged("file", busy_timeout, || Connection::open(path))
}

/// Opens an in-memory SQLite database with the schema applied.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged(
        "memory",
        Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        Connection::open_in_memory,
    )
}

fn open_logged(
    mode: &str,
    busy_timeout: Duration,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, busy_timeout) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} busy_timeout_ms={} duration_ms={}",
                mode,
                busy_timeout.as_millis(),
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    ensure_schema(conn)?;
    Ok(())
}
