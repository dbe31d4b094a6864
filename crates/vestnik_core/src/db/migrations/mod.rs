//! Schema migration registry for the embedded SQLite store.
//!
//! # Responsibility
//! - Hold the ordered list of schema migrations compiled into the binary.
//! - Bring opened connections up to the latest schema atomically.
//!
//! # Invariants
//! - Migration versions are strictly increasing.
//! - `PRAGMA user_version` always reflects the last applied migration.

use crate::db::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;

/// One registered schema step.
#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "init",
    sql: include_str!("0001_init.sql"),
}];

/// Highest schema version this binary can produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |last| last.version)
}

/// Brings the connection's schema up to [`latest_version`].
///
/// A database written by a newer binary is rejected rather than modified.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let installed = schema_version_of(conn)?;
    let latest = latest_version();

    if installed > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: installed,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > installed)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        debug!(
            "event=migration_applied module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    Ok(())
}

fn schema_version_of(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
