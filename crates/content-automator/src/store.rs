//! Typed job store on top of the SQL repository.
//!
//! `JobStore` owns input validation, default values, timestamps and the
//! mapping of "no row affected" onto [`JobError::NotFound`].

use chrono::Utc;
use serde::Serialize;

use crate::db::{job_repo, Database};
use crate::error::JobError;
use crate::job::{format_timestamp, Job, JobStatus, DEFAULT_KIND};

/// Number of jobs in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.processing + self.completed + self.failed
    }
}

#[derive(Clone)]
pub struct JobStore {
    db: Database,
}

impl JobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates a pending job. Empty `kind` falls back to [`DEFAULT_KIND`].
    pub fn create(&self, topic: &str, kind: &str) -> Result<Job, JobError> {
        if topic.trim().is_empty() {
            return Err(JobError::Validation("topic is required".to_string()));
        }
        let kind = match kind.trim() {
            "" => DEFAULT_KIND,
            k => k,
        };

        let now = format_timestamp(Utc::now());
        let row = job_repo::insert(&self.db, topic, kind, &now)?;
        log::debug!("Created job {} ({}): {}", row.id, kind, topic);
        Ok(row.into_job()?)
    }

    pub fn get(&self, id: i64) -> Result<Job, JobError> {
        match job_repo::find_by_id(&self.db, id)? {
            Some(row) => Ok(row.into_job()?),
            None => Err(JobError::NotFound(id)),
        }
    }

    /// All jobs, newest first.
    pub fn list(&self) -> Result<Vec<Job>, JobError> {
        rows_into_jobs(job_repo::list_all(&self.db)?)
    }

    pub fn delete(&self, id: i64) -> Result<(), JobError> {
        if job_repo::delete(&self.db, id)? {
            Ok(())
        } else {
            Err(JobError::NotFound(id))
        }
    }

    /// Writes status, output and a fresh `updated_at` as one statement.
    pub fn update_status(&self, id: i64, status: JobStatus, output: &str) -> Result<(), JobError> {
        let now = format_timestamp(Utc::now());
        if job_repo::update_status(&self.db, id, status.as_str(), output, &now)? {
            Ok(())
        } else {
            Err(JobError::NotFound(id))
        }
    }

    /// Oldest pending job, read fresh from the database. Does not claim it.
    pub fn next_pending(&self) -> Result<Option<Job>, JobError> {
        job_repo::next_pending(&self.db)?
            .map(|row| row.into_job().map_err(JobError::from))
            .transpose()
    }

    /// All pending jobs, oldest first.
    pub fn all_pending(&self) -> Result<Vec<Job>, JobError> {
        rows_into_jobs(job_repo::all_pending(&self.db)?)
    }

    /// Atomically moves a still-pending job to processing.
    ///
    /// Returns `None` when the job was deleted or already claimed by someone
    /// else; exactly one concurrent caller can get `Some` for a given id.
    pub fn claim(&self, id: i64) -> Result<Option<Job>, JobError> {
        let now = format_timestamp(Utc::now());
        job_repo::claim(&self.db, id, &now)?
            .map(|row| row.into_job().map_err(JobError::from))
            .transpose()
    }

    /// Atomically claims the oldest pending job, if any.
    pub fn claim_next(&self) -> Result<Option<Job>, JobError> {
        let now = format_timestamp(Utc::now());
        job_repo::claim_next(&self.db, &now)?
            .map(|row| row.into_job().map_err(JobError::from))
            .transpose()
    }

    pub fn count_by_status(&self) -> Result<StatusCounts, JobError> {
        let mut counts = StatusCounts::default();
        for (status, n) in job_repo::count_by_status(&self.db)? {
            match status.parse::<JobStatus>() {
                Ok(JobStatus::Pending) => counts.pending = n,
                Ok(JobStatus::Processing) => counts.processing = n,
                Ok(JobStatus::Completed) => counts.completed = n,
                Ok(JobStatus::Failed) => counts.failed = n,
                Err(e) => log::warn!("Ignoring jobs with {}", e),
            }
        }
        Ok(counts)
    }
}

fn rows_into_jobs(rows: Vec<job_repo::JobRow>) -> Result<Vec<Job>, JobError> {
    rows.into_iter()
        .map(|row| row.into_job().map_err(JobError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> JobStore {
        JobStore::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_create_starts_pending_with_empty_output() {
        let store = store();
        let job = store.create("rust ownership", "").unwrap();

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.output, "");
        assert_eq!(job.kind, DEFAULT_KIND);
        assert_eq!(job.created_at, job.updated_at);
        assert_eq!(store.get(job.id).unwrap(), job);
    }

    #[test]
    fn test_create_keeps_explicit_kind() {
        let store = store();
        let job = store.create("release notes", "newsletter").unwrap();
        assert_eq!(job.kind, "newsletter");
    }

    #[test]
    fn test_create_stores_topic_as_submitted() {
        let store = store();
        let job = store.create("  padded topic \n", "").unwrap();
        assert_eq!(job.topic, "  padded topic \n");
        assert_eq!(store.get(job.id).unwrap().topic, "  padded topic \n");
    }

    #[test]
    fn test_create_rejects_blank_topic() {
        let store = store();
        assert!(matches!(store.create("", "blog"), Err(JobError::Validation(_))));
        assert!(matches!(store.create("   ", "blog"), Err(JobError::Validation(_))));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_get_and_delete_missing() {
        let store = store();
        assert!(matches!(store.get(5), Err(JobError::NotFound(5))));
        assert!(matches!(store.delete(5), Err(JobError::NotFound(5))));
        assert!(matches!(
            store.update_status(5, JobStatus::Completed, "x"),
            Err(JobError::NotFound(5))
        ));
    }

    #[test]
    fn test_delete_is_allowed_in_any_status() {
        let store = store();
        let job = store.create("t", "").unwrap();
        store.claim(job.id).unwrap().unwrap();
        store.delete(job.id).unwrap();
        assert!(matches!(store.get(job.id), Err(JobError::NotFound(_))));
    }

    #[test]
    fn test_update_status_writes_status_and_output_together() {
        let store = store();
        let job = store.create("t", "").unwrap();
        store
            .update_status(job.id, JobStatus::Completed, "article")
            .unwrap();

        let job = store.get(job.id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.output, "article");
        assert!(job.updated_at >= job.created_at);
    }

    #[test]
    fn test_next_pending_follows_creation_order() {
        let store = store();
        let ids: Vec<i64> = ["first", "second", "third"]
            .iter()
            .map(|t| store.create(t, "").unwrap().id)
            .collect();

        for id in ids {
            let next = store.next_pending().unwrap().unwrap();
            assert_eq!(next.id, id);
            assert_eq!(next.status, JobStatus::Pending);
            store.claim(next.id).unwrap().unwrap();
            assert_ne!(store.next_pending().unwrap().map(|j| j.id), Some(id));
        }
        assert!(store.next_pending().unwrap().is_none());
    }

    #[test]
    fn test_claim_next_returns_processing_job() {
        let store = store();
        let job = store.create("t", "").unwrap();

        let claimed = store.claim_next().unwrap().unwrap();
        assert_eq!(claimed.id, job.id);
        assert_eq!(claimed.status, JobStatus::Processing);
        assert!(store.claim_next().unwrap().is_none());
        assert!(store.claim(job.id).unwrap().is_none());
    }

    #[test]
    fn test_all_pending_excludes_claimed() {
        let store = store();
        let a = store.create("a", "").unwrap();
        let b = store.create("b", "").unwrap();
        store.claim(a.id).unwrap();

        let pending: Vec<i64> = store.all_pending().unwrap().iter().map(|j| j.id).collect();
        assert_eq!(pending, vec![b.id]);
    }

    #[test]
    fn test_count_by_status() {
        let store = store();
        let a = store.create("a", "").unwrap();
        store.create("b", "").unwrap();
        store.create("c", "").unwrap();
        store.claim(a.id).unwrap();

        let counts = store.count_by_status().unwrap();
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.processing, 1);
        assert_eq!(counts.total(), 3);
    }
}
