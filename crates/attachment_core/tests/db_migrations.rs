use attachment_core::db::migrations::{current_user_version, latest_version};
use attachment_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn in_memory_database_has_latest_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert!(table_exists(&conn, "attachments"));
    assert!(table_exists(&conn, "attachment_joins"));
}

#[test]
fn reopening_a_file_database_keeps_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attachments.db");

    drop(open_db(&path).unwrap());
    let conn = open_db(&path).unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert!(table_exists(&conn, "attachment_joins"));
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 42);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_obj_type_is_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO attachments (uuid, obj_type) VALUES ('x', '  ');",
        [],
    );
    assert!(result.is_err());
}

fn table_exists(conn: &Connection, table: &str) -> bool {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}
