//! In-memory job registry
//!
//! **[CUR-ST-010]** Single shared mutable resource of the service. One
//! record per job id; updates are applied synchronously under the lock and
//! never held across an await point, so tasks interleave safely at their
//! suspension points.
//!
//! **[CUR-ST-020]** Terminal records are immutable: late progress updates
//! against a completed or failed job are ignored. A periodic sweep removes
//! records older than the retention window regardless of status.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{CurationReport, Job, JobSnapshot, JobState, Stage, StageMeta};

/// Jobs are purged once older than this, terminal or not
pub const JOB_RETENTION: std::time::Duration = std::time::Duration::from_secs(60 * 60);

/// Period of the background sweep task
pub const SWEEP_PERIOD: std::time::Duration = std::time::Duration::from_secs(60 * 60);

/// Handle to the shared job table; clones share the same records
#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new job record in the initial `processing` state
    ///
    /// The record is visible to `get` before this returns, so the id can be
    /// handed to a client ahead of any background work.
    pub fn create(&self) -> JobSnapshot {
        let job = Job::new();
        let snapshot = job.snapshot();

        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        jobs.insert(job.id, job);

        snapshot
    }

    /// Snapshot of a job, or `None` for an unknown id
    ///
    /// An absent id is reported as absent, never as an empty default record:
    /// callers must be able to distinguish "unknown job" from "job with no
    /// progress yet".
    pub fn get(&self, id: Uuid) -> Option<JobSnapshot> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&id).map(Job::snapshot)
    }

    /// Advance a processing job: set the stage, raise progress, merge meta
    ///
    /// Progress is monotonic: a lower value than the current one is clamped
    /// up to it. No-op on unknown ids and on terminal records.
    pub fn advance(&self, id: Uuid, stage: Stage, progress: f64, patch: StageMeta) {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let Some(job) = jobs.get_mut(&id) else {
            return;
        };

        if let JobState::Processing {
            stage: current_stage,
            progress: current_progress,
            meta,
        } = &mut job.state
        {
            *current_stage = stage;
            *current_progress = progress.max(*current_progress).min(100.0);
            meta.merge(patch);
        }
    }

    /// Transition a job to `completed`, replacing the live-progress shape
    /// with the final report
    pub fn complete(&self, id: Uuid, report: CurationReport) {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let Some(job) = jobs.get_mut(&id) else {
            return;
        };

        if !job.state.is_terminal() {
            job.state = JobState::Completed {
                progress: 100.0,
                report,
            };
        }
    }

    /// Transition a job to `failed`; finer-grained progress detail is
    /// dropped with it
    pub fn fail(&self, id: Uuid, error: String) {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let Some(job) = jobs.get_mut(&id) else {
            return;
        };

        if !job.state.is_terminal() {
            job.state = JobState::Failed {
                progress: 0.0,
                error,
            };
        }
    }

    /// Remove all records older than `retention`, terminal or not
    ///
    /// Returns the number of records removed.
    pub fn sweep(&self, retention: std::time::Duration) -> usize {
        let Ok(retention) = chrono::Duration::from_std(retention) else {
            return 0;
        };
        let cutoff = Utc::now() - retention;

        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let before = jobs.len();
        jobs.retain(|id, job| {
            let keep = job.started_at > cutoff;
            if !keep {
                debug!(job_id = %id, "Sweeping expired job");
            }
            keep
        });

        before - jobs.len()
    }

    /// Number of tracked jobs (diagnostics)
    pub fn len(&self) -> usize {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Backdate a job's creation time (sweep tests)
    #[cfg(test)]
    pub(crate) fn backdate(&self, id: Uuid, by: chrono::Duration) {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(job) = jobs.get_mut(&id) {
            job.started_at = job.started_at - by;
        }
    }
}
