//! In-memory job status store.
//!
//! One record per job, keyed by id. Polling clients read concurrently;
//! only the orchestrator task that owns a job mutates it, through the
//! guarded methods here which also enforce the lifecycle invariants:
//!
//! - `pending → processing → {completed | failed}`, never backwards
//! - progress is non-decreasing while processing
//! - terminal records are immutable (attempts are logged and dropped)

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use subgen_core::{Job, JobResult, JobState};

/// A stored record plus its eviction bookkeeping.
struct JobEntry {
    job: Job,
    finished_at: Option<Instant>,
}

/// Keyed store of job status records.
#[derive(Default)]
pub struct JobStore {
    inner: RwLock<HashMap<String, JobEntry>>,
}

impl JobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh pending job and return a snapshot of it.
    pub fn create(&self) -> Job {
        let job = Job::pending(Uuid::new_v4().to_string());
        let entry = JobEntry {
            job: job.clone(),
            finished_at: None,
        };
        let _ = self.inner.write().insert(job.id.clone(), entry);
        job
    }

    /// Snapshot a job by id.
    pub fn get(&self, id: &str) -> Option<Job> {
        self.inner.read().get(id).map(|e| e.job.clone())
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Move a job into `processing` with the given progress and message.
    ///
    /// Progress never decreases; calls against a terminal record are
    /// ignored with a warning.
    pub fn set_processing(&self, id: &str, progress: u8, message: impl Into<String>) {
        let mut inner = self.inner.write();
        let Some(entry) = inner.get_mut(id) else {
            warn!(job_id = id, "progress update for unknown job");
            return;
        };
        if entry.job.state.is_terminal() {
            warn!(job_id = id, "progress update after terminal state ignored");
            return;
        }
        entry.job.state = JobState::Processing;
        entry.job.progress = entry.job.progress.max(progress.min(100));
        entry.job.message = Some(message.into());
        debug!(job_id = id, progress = entry.job.progress, "job progress");
    }

    /// Complete a job with its subtitle artifact.
    pub fn complete(&self, id: &str, result: JobResult) {
        let mut inner = self.inner.write();
        let Some(entry) = inner.get_mut(id) else {
            warn!(job_id = id, "completion for unknown job");
            return;
        };
        if entry.job.state.is_terminal() {
            warn!(job_id = id, "completion after terminal state ignored");
            return;
        }
        entry.job.state = JobState::Completed;
        entry.job.progress = 100;
        entry.job.message = None;
        entry.job.result = Some(result);
        entry.finished_at = Some(Instant::now());
    }

    /// Fail a job with a human-readable cause. No result is ever kept.
    pub fn fail(&self, id: &str, error: impl Into<String>) {
        let mut inner = self.inner.write();
        let Some(entry) = inner.get_mut(id) else {
            warn!(job_id = id, "failure for unknown job");
            return;
        };
        if entry.job.state.is_terminal() {
            warn!(job_id = id, "failure after terminal state ignored");
            return;
        }
        entry.job.state = JobState::Failed;
        entry.job.message = None;
        entry.job.result = None;
        entry.job.error = Some(error.into());
        entry.finished_at = Some(Instant::now());
    }

    /// Drop terminal records that finished more than `retention` ago.
    ///
    /// Returns the number of evicted records.
    pub fn evict_finished(&self, retention: Duration) -> usize {
        let mut inner = self.inner.write();
        let before = inner.len();
        inner.retain(|_, entry| {
            entry
                .finished_at
                .is_none_or(|finished| finished.elapsed() < retention)
        });
        let evicted = before - inner.len();
        if evicted > 0 {
            debug!(evicted, remaining = inner.len(), "evicted finished jobs");
        }
        evicted
    }
}
