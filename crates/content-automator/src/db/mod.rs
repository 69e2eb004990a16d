//! SQLite persistence for the job queue.
//!
//! One connection behind a mutex serves the worker loop, forced sweeps and
//! the HTTP handlers. Schema changes live in [`migrations`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub mod error;
pub mod job_repo;
pub mod migrations;

pub use error::DatabaseError;

/// Statements applied to every file-backed connection before migrating.
const FILE_PRAGMAS: &str = "PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;";

/// Shared handle to the job database.
///
/// Clones point at the same connection. Statements run one at a time through
/// [`Database::with_conn`], so a claim issued by one caller is visible to the
/// next caller as soon as it returns.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the database file, creating it and its directory when missing,
    /// and brings the schema up to date.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        ensure_parent_dir(path)?;

        let conn = Connection::open(path)?;
        conn.execute_batch(FILE_PRAGMAS)?;

        let db = Self::migrated(conn)?;
        log::info!(
            "Job database ready at {} (schema v{})",
            path.display(),
            db.schema_version()?
        );
        Ok(db)
    }

    /// Opens a private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` while holding the connection lock.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }

    /// Highest migration version applied to this database.
    pub fn schema_version(&self) -> Result<u32, DatabaseError> {
        self.with_conn(migrations::current_version)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), DatabaseError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| DatabaseError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Default location of the job database: `~/.content-automator/data/content.db`.
pub fn default_database_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".content-automator").join("data").join("content.db"))
}
