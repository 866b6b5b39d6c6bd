/// Schema setup for the blob database
///
/// Migrations are an ordered list; entry `n` brings the schema from version
/// `n` to `n + 1`. Pending entries run in one transaction together with the
/// version bump, so a failed upgrade leaves the file untouched.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::storage::StorageError;

struct Migration {
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    description: "blob table",
    sql: "CREATE TABLE IF NOT EXISTS blobs (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
}];

/// Schema version this build writes
fn latest_version() -> i32 {
    MIGRATIONS.len() as i32
}

/// Create or upgrade the schema
///
/// Fails with `StorageError::Migration` on a database written by a newer
/// build, rather than guessing at its layout.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    let found = schema_version(conn)?;
    let latest = latest_version();

    if found > latest {
        return Err(StorageError::Migration(format!(
            "database is at schema version {}, this build only knows up to {}",
            found, latest
        )));
    }
    if found == latest {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;
    for (index, migration) in MIGRATIONS.iter().enumerate().skip(found as usize) {
        tx.execute_batch(migration.sql)?;
        info!("Applied migration v{}: {}", index + 1, migration.description);
    }
    write_version(&tx, latest)?;
    tx.commit()?;

    Ok(())
}

/// Recorded schema version, 0 for a fresh database
fn schema_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .optional()?
        .flatten()
        .unwrap_or(0);

    Ok(version)
}

fn write_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}
