//! Connection factory for attachment storage.
//!
//! # Invariants
//! - Returned connections enforce `foreign_keys`, so deleting an attachment
//!   drops its joins.
//! - Returned connections are at `migrations::latest_version()`.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
enum OpenMode {
    File,
    Memory,
}

impl OpenMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens (or creates) a database file and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_logged(OpenMode::File, || Ok(Connection::open(path)?))
}

/// Opens a private in-memory database and migrates it.
///
/// This is what the registry's `database` binding hands out.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged(OpenMode::Memory, || Ok(Connection::open_in_memory()?))
}

fn open_logged(
    mode: OpenMode,
    open: impl FnOnce() -> DbResult<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = open().and_then(|mut conn| {
        prepare(&mut conn)?;
        Ok(conn)
    });

    let elapsed_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={elapsed_ms}",
            mode.as_str()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={elapsed_ms} error={err}",
            mode.as_str()
        ),
    }
    result
}

fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}

#[cfg(test)]
mod tests {
    use super::open_db_in_memory;

    #[test]
    fn foreign_keys_are_enforced() {
        let conn = open_db_in_memory().expect("open");
        let enabled: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("pragma");
        assert_eq!(enabled, 1);
    }
}
