//! Versioned schema migrations.
//!
//! Applied versions are recorded in `_migrations`; each pending script runs
//! in its own transaction together with its bookkeeping row.

use rusqlite::Connection;

use super::error::DatabaseError;

/// A single migration definition.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// All migrations in order. Each is applied at most once.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_jobs_table",
        sql: include_str!("sql/001_create_jobs.sql"),
    },
    Migration {
        version: 2,
        description: "add_pending_queue_index",
        sql: include_str!("sql/002_pending_queue_index.sql"),
    },
];

/// Version of the newest migration this build knows about.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Highest version recorded in `_migrations`, or 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<u32, DatabaseError> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}

/// Applies every migration newer than the recorded version.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let applied = current_version(conn)?;
    MIGRATIONS
        .iter()
        .filter(|m| m.version > applied)
        .try_for_each(|m| apply(conn, m))
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), DatabaseError> {
    log::info!(
        "Applying schema migration v{} ({})",
        migration.version,
        migration.description
    );

    let batch = format!(
        "BEGIN;\n{sql}\nINSERT INTO _migrations (version, description) VALUES ({version}, '{description}');\nCOMMIT;",
        sql = migration.sql,
        version = migration.version,
        description = migration.description,
    );

    conn.execute_batch(&batch).map_err(|e| {
        if !conn.is_autocommit() {
            if let Err(rollback) = conn.execute_batch("ROLLBACK;") {
                log::warn!("Rollback after failed migration failed: {}", rollback);
            }
        }
        DatabaseError::Migration {
            version: migration.version,
            reason: e.to_string(),
        }
    })
}
