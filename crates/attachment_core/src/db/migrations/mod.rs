//! Attachment schema migrations.
//!
//! # Responsibility
//! - List schema steps in version order.
//! - Bring a connection from its recorded version up to `latest_version()`.
//!
//! # Invariants
//! - Versions start at 1 and increase by one per step.
//! - Each step commits together with its `PRAGMA user_version` bump, so a
//!   failed step leaves the previous version in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "attachments",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "attachment_joins",
        sql: include_str!("0002_attachment_joins.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

/// Applies every step newer than the recorded version.
///
/// Fails with `UnsupportedSchemaVersion` when the database was written by a
/// newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let recorded = current_user_version(conn)?;
    let latest = latest_version();
    if recorded > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: recorded,
            latest_supported: latest,
        });
    }

    for migration in MIGRATIONS.iter().filter(|step| step.version > recorded) {
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)
            .map_err(|source| DbError::Migration {
                version: migration.version,
                source,
            })?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;

        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }

    Ok(())
}
