//! The job status record exposed to polling clients.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a subtitle generation job.
///
/// Transitions are monotonic: `pending → processing → {completed | failed}`.
/// A job never leaves a terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Accepted, not yet picked up by the orchestrator.
    Pending,
    /// The orchestrator is running phases.
    Processing,
    /// Finished with a result.
    Completed,
    /// Finished with an error; no result is ever populated.
    Failed,
}

impl JobState {
    /// Whether this state is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The finished subtitle artifact, present only on completed jobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// Full SRT document text.
    pub srt_content: String,
    /// Suggested download filename, derived from the upload name.
    pub filename: String,
}

/// A job status record, keyed by id in the job store.
///
/// Serialized form is the polling wire contract: optional fields are
/// omitted when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job id handed back to the client as `task_id`.
    pub id: String,
    /// Current lifecycle state.
    pub state: JobState,
    /// Progress percentage, 0–100, non-decreasing while processing.
    pub progress: u8,
    /// Human-readable phase description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Subtitle artifact; `Some` only when `state == Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    /// Failure cause; `Some` only when `state == Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Create a fresh pending job.
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: JobState::Pending,
            progress: 0,
            message: None,
            result: None,
            error: None,
        }
    }
}
