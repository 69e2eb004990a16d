//! SQL operations for the `jobs` table.
//!
//! Every function here is a single statement against the shared connection.
//! The claim functions are conditional updates so that two callers racing on
//! the same pending row can never both win it.

use rusqlite::{params, Connection, Row};

use super::{Database, DatabaseError};
use crate::job::{parse_timestamp, Job, JobStatus};

const COLUMNS: &str = "id, topic, type, status, output, created_at, updated_at";

/// A raw job row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: i64,
    pub topic: String,
    pub kind: String,
    pub status: String,
    pub output: String,
    pub created_at: String,
    pub updated_at: String,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            topic: row.get("topic")?,
            kind: row.get("type")?,
            status: row.get("status")?,
            output: row.get("output")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Converts the raw row into a typed [`Job`].
    pub fn into_job(self) -> Result<Job, DatabaseError> {
        let status: JobStatus = self.status.parse().map_err(DatabaseError::InvalidRow)?;
        let created_at = parse_timestamp(&self.created_at).map_err(|e| {
            DatabaseError::InvalidRow(format!("job {} created_at: {}", self.id, e))
        })?;
        let updated_at = parse_timestamp(&self.updated_at).map_err(|e| {
            DatabaseError::InvalidRow(format!("job {} updated_at: {}", self.id, e))
        })?;

        Ok(Job {
            id: self.id,
            topic: self.topic,
            kind: self.kind,
            status,
            output: self.output,
            created_at,
            updated_at,
        })
    }
}

/// Runs a row-returning statement to completion and collects every row.
fn collect_rows<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<JobRow>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, JobRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Inserts a new pending job and returns the stored row.
pub fn insert(
    db: &Database,
    topic: &str,
    kind: &str,
    now: &str,
) -> Result<JobRow, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO jobs (topic, type, status, output, created_at, updated_at)
             VALUES (?1, ?2, 'pending', '', ?3, ?3)",
            params![topic, kind, now],
        )?;
        Ok(JobRow {
            id: conn.last_insert_rowid(),
            topic: topic.to_string(),
            kind: kind.to_string(),
            status: JobStatus::Pending.as_str().to_string(),
            output: String::new(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    })
}

/// Finds a job by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM jobs WHERE id = ?1", COLUMNS))?;
        let mut rows = stmt.query_map(params![id], JobRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists all jobs, newest first.
pub fn list_all(db: &Database) -> Result<Vec<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        collect_rows(
            conn,
            &format!(
                "SELECT {} FROM jobs ORDER BY created_at DESC, id DESC",
                COLUMNS
            ),
            [],
        )
    })
}

/// Deletes a job regardless of its status. Returns false if no row matched.
pub fn delete(db: &Database, id: i64) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    })
}

/// Sets status, output and updated_at in one statement. `updated_at` never
/// moves backwards. Returns false if no row matched.
pub fn update_status(
    db: &Database,
    id: i64,
    status: &str,
    output: &str,
    updated_at: &str,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute(
            "UPDATE jobs SET status = ?2, output = ?3, updated_at = MAX(updated_at, ?4)
             WHERE id = ?1",
            params![id, status, output, updated_at],
        )?;
        Ok(affected > 0)
    })
}

/// Returns the oldest pending job without claiming it.
pub fn next_pending(db: &Database) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let rows = collect_rows(
            conn,
            &format!(
                "SELECT {} FROM jobs WHERE status = 'pending'
                 ORDER BY created_at ASC, id ASC LIMIT 1",
                COLUMNS
            ),
            [],
        )?;
        Ok(rows.into_iter().next())
    })
}

/// Returns every pending job, oldest first.
pub fn all_pending(db: &Database) -> Result<Vec<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        collect_rows(
            conn,
            &format!(
                "SELECT {} FROM jobs WHERE status = 'pending' ORDER BY created_at ASC, id ASC",
                COLUMNS
            ),
            [],
        )
    })
}

/// Moves one job from pending to processing if, and only if, it is still
/// pending. Returns the claimed row, or `None` if the row is gone or was
/// already claimed.
pub fn claim(db: &Database, id: i64, updated_at: &str) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let rows = collect_rows(
            conn,
            &format!(
                "UPDATE jobs SET status = 'processing', output = '',
                     updated_at = MAX(updated_at, ?2)
                 WHERE id = ?1 AND status = 'pending'
                 RETURNING {}",
                COLUMNS
            ),
            params![id, updated_at],
        )?;
        Ok(rows.into_iter().next())
    })
}

/// Claims the oldest pending job in a single statement.
pub fn claim_next(db: &Database, updated_at: &str) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let rows = collect_rows(
            conn,
            &format!(
                "UPDATE jobs SET status = 'processing', output = '',
                     updated_at = MAX(updated_at, ?1)
                 WHERE status = 'pending' AND id = (
                     SELECT id FROM jobs WHERE status = 'pending'
                     ORDER BY created_at ASC, id ASC LIMIT 1
                 )
                 RETURNING {}",
                COLUMNS
            ),
            params![updated_at],
        )?;
        Ok(rows.into_iter().next())
    })
}

/// Counts jobs grouped by status. Statuses without jobs are omitted.
pub fn count_by_status(db: &Database) -> Result<Vec<(String, u64)>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM jobs GROUP BY status")?;
        let counts = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    })
}
