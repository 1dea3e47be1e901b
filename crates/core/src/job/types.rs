//! Types for the job lifecycle subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::ConsolidatedOutput;

/// Errors that can occur during job operations.
#[derive(Debug, Error)]
pub enum JobError {
    /// Job not found.
    #[error("job not found: {0}")]
    NotFound(String),

    /// Cannot perform operation due to current status.
    #[error("cannot {operation} job {job_id}: current status is {current_status}")]
    InvalidStatus {
        job_id: String,
        current_status: String,
        operation: String,
    },

    /// The pipeline run behind this job failed.
    #[error("job execution failed: {0}")]
    ExecutionFailed(String),
}

/// Status of a job. A job is in exactly one status at any observation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, pipeline not yet started.
    Queued,
    /// Pipeline is executing.
    Running,
    /// Pipeline finished; `result` is populated.
    Completed,
    /// Pipeline hit an unrecoverable error; `error` is populated.
    Failed,
    /// Marked canceled by a client. The mark is cooperative: an in-flight
    /// run stops at its next stage boundary, not mid-call.
    Canceled,
}

impl JobStatus {
    /// Whether the job can still make progress.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    /// Whether the job reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Stable snake_case name, used in API payloads and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
        }
    }
}

/// Progress annotation on a running job.
///
/// Percentages are advisory milestones, not a measure of work performed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    pub message: String,
    pub percentage: u8,
}

/// One pipeline execution, owned exclusively by the [`JobStore`].
///
/// Everything outside the store sees clones of this; mutating a snapshot has
/// no effect on stored state.
///
/// [`JobStore`]: super::JobStore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<JobProgress>,
    /// Present only when `status == Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConsolidatedOutput>,
    /// Present only when `status == Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
