//! Per-job processing shared by the worker loop and forced sweeps.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, info_span, warn};

use crate::error::JobError;
use crate::generator::ContentGenerator;
use crate::job::{Job, JobStatus, EMPTY_OUTPUT_FAILURE};
use crate::store::JobStore;

/// How a claimed job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed,
    Failed,
    /// The final status write failed; the job keeps its last written status.
    Abandoned,
}

/// Result of one forced sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Pending jobs in the snapshot taken at the start of the sweep.
    pub snapshot: usize,
    pub completed: usize,
    pub failed: usize,
    /// Jobs that were claimed elsewhere, deleted, or could not be claimed.
    pub skipped: usize,
}

/// Claims jobs and drives them through generation to a terminal status.
#[derive(Clone)]
pub struct JobProcessor {
    store: JobStore,
    generator: Arc<dyn ContentGenerator>,
}

impl JobProcessor {
    pub fn new(store: JobStore, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn generator(&self) -> &Arc<dyn ContentGenerator> {
        &self.generator
    }

    /// Claims the oldest pending job and processes it.
    ///
    /// Returns `Ok(None)` when the queue is empty.
    pub fn process_next(&self) -> Result<Option<(i64, ProcessOutcome)>, JobError> {
        match self.store.claim_next()? {
            Some(job) => {
                info!("Found pending job: {}", job.id);
                let id = job.id;
                Ok(Some((id, self.run_claimed(job))))
            }
            None => Ok(None),
        }
    }

    /// Processes every job that is pending right now, oldest first.
    ///
    /// Jobs created after the snapshot are left for the loop. A job that
    /// cannot be claimed (already taken, or deleted) is skipped.
    pub fn process_all_pending(&self) -> Result<SweepSummary, JobError> {
        let jobs = self.store.all_pending()?;
        let mut summary = SweepSummary {
            snapshot: jobs.len(),
            ..Default::default()
        };
        info!("Processing {} pending jobs", jobs.len());

        for job in jobs {
            let claimed = match self.store.claim(job.id) {
                Ok(Some(claimed)) => claimed,
                Ok(None) => {
                    debug!("Job {} no longer pending, skipping", job.id);
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!("Failed to claim job {}: {}", job.id, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.run_claimed(claimed) {
                ProcessOutcome::Completed => summary.completed += 1,
                ProcessOutcome::Failed => summary.failed += 1,
                ProcessOutcome::Abandoned => summary.skipped += 1,
            }
        }

        Ok(summary)
    }

    /// Generates output for a job this processor has just claimed and writes
    /// the terminal status.
    pub fn run_claimed(&self, job: Job) -> ProcessOutcome {
        let _span = info_span!("worker.job", job_id = job.id).entered();
        info!("Processing job {}: {}", job.id, job.topic);

        let (status, output) = match self.generator.generate(&job.topic) {
            Ok(text) if !text.is_empty() => {
                debug!("Generated content length: {} characters", text.len());
                (JobStatus::Completed, text)
            }
            Ok(_) => (JobStatus::Failed, EMPTY_OUTPUT_FAILURE.to_string()),
            Err(e) => (JobStatus::Failed, format!("Processing error: {}", e)),
        };

        match self.store.update_status(job.id, status, &output) {
            Ok(()) if status == JobStatus::Completed => {
                info!("Job {} completed successfully", job.id);
                ProcessOutcome::Completed
            }
            Ok(()) => {
                warn!("Job {} failed: {}", job.id, output);
                ProcessOutcome::Failed
            }
            Err(JobError::NotFound(_)) => {
                warn!("Job {} was deleted while processing", job.id);
                ProcessOutcome::Abandoned
            }
            Err(e) => {
                error!("Failed to update job {} to {}: {}", job.id, status, e);
                ProcessOutcome::Abandoned
            }
        }
    }
}
