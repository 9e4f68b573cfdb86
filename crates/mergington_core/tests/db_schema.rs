use mergington_core::db::schema::{schema_version, SCHEMA_VERSION};
use mergington_core::db::{open_db, open_db_in_memory, open_db_with_timeout, open_storage, DbError};
use mergington_core::{
    Activity, ActivityRepository, ActivityService, ActivityServiceError, RepoError,
    SqliteActivityRepository, StorageConfig,
};
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn open_db_in_memory_creates_activity_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    assert_table_exists(&conn, "activities");
    assert_table_exists(&conn, "activity_participants");
}

#[test]
fn reopening_database_keeps_rosters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mergington.sqlite3");

    {
        let repo = SqliteActivityRepository::new(open_db(&path).unwrap());
        repo.provision_activity(&Activity::new("Art Club", "Paint", "Thursdays", 4))
            .unwrap();
        repo.append_participant("Art Club", "zoe@x.edu").unwrap();
    }

    let repo = SqliteActivityRepository::new(open_db(&path).unwrap());
    let stored = repo.get_activity("Art Club").unwrap().unwrap();
    assert_eq!(stored.participants, vec!["zoe@x.edu"]);
}

#[test]
fn open_storage_uses_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("configured.sqlite3"),
        busy_timeout_ms: 250,
    };

    let conn = open_storage(&config).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    assert!(config.database_path.exists());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn locked_database_surfaces_timeout_instead_of_hanging() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.sqlite3");

    let holder = open_db(&path).unwrap();
    SqliteActivityRepository::new(open_db(&path).unwrap())
        .provision_activity(&Activity::new("Art Club", "Paint", "Thursdays", 4))
        .unwrap();
    holder.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let service = ActivityService::new(SqliteActivityRepository::new(
        open_db_with_timeout(&path, Duration::from_millis(50)).unwrap(),
    ));
    let err = service.signup("Art Club", "zoe@x.edu").unwrap_err();

    assert!(matches!(err, ActivityServiceError::Repo(RepoError::Timeout(_))));
    assert!(!err.is_domain());
    assert_eq!(err.code(), "storage_timeout");

    holder.execute_batch("ROLLBACK;").unwrap();
    service.signup("Art Club", "zoe@x.edu").unwrap();
}

#[test]
fn malformed_stored_document_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO activities (name, description, schedule, max_participants)
         VALUES ('Tiny Club', 'd', 's', 1);
         INSERT INTO activity_participants (activity_name, email, position)
         VALUES ('Tiny Club', 'a@x.edu', 1), ('Tiny Club', 'b@x.edu', 2);",
    )
    .unwrap();
    let repo = SqliteActivityRepository::new(conn);

    let err = repo.list_activities().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn provisioning_rejects_invalid_activity() {
    let repo = SqliteActivityRepository::new(open_db_in_memory().unwrap());

    let err = repo
        .provision_activity(&Activity::new("Empty Club", "d", "s", 0))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_activities().unwrap().is_empty());
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
