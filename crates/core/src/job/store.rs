//! In-memory job registry.
//!
//! The store is the only shared mutable state in the pipeline core. It is
//! constructed once at process start and injected wherever job state is
//! read or written; nothing else holds a `Job` by reference. All access goes
//! through an async `RwLock` so a polling client never observes a torn write.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::pipeline::ConsolidatedOutput;

use super::types::{Job, JobError, JobProgress, JobStatus};

/// Keyed registry of jobs with a create-then-run contract: at most one
/// concurrent execution per job id.
pub struct JobStore {
    jobs: tokio::sync::RwLock<HashMap<String, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: tokio::sync::RwLock::new(HashMap::new()),
        }
    }

    /// Allocate a new job in `Queued` status and return its id.
    pub async fn create_job(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let job = Job {
            id: id.clone(),
            status: JobStatus::Queued,
            created_at: now,
            updated_at: now,
            progress: None,
            result: None,
            error: None,
        };

        self.jobs.write().await.insert(id.clone(), job);
        metrics::JOBS_CREATED.inc();
        debug!(job_id = %id, "Job created");
        id
    }

    /// Read-only snapshot of a job. Callers own the clone.
    pub async fn get_job(&self, job_id: &str) -> Option<Job> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Snapshots of all jobs, newest first.
    pub async fn list_jobs(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    /// Transition the job to `Running`, await `executor`, and record the
    /// terminal status: `Completed` with the result, or `Failed` with the
    /// error message.
    ///
    /// The executor's error is recorded in the store *and* returned, so a
    /// caller that fires and forgets this future must wrap it in its own
    /// error boundary (the pipeline executor's `spawn` does).
    ///
    /// If the job was canceled between creation and this call, the run is
    /// not started and the `Canceled` status is left untouched.
    pub async fn process_job<F, Fut>(
        &self,
        job_id: &str,
        executor: F,
    ) -> Result<ConsolidatedOutput, JobError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ConsolidatedOutput, JobError>>,
    {
        {
            let mut jobs = self.jobs.write().await;
            let job = jobs
                .get_mut(job_id)
                .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

            match job.status {
                JobStatus::Queued => {
                    job.status = JobStatus::Running;
                    job.updated_at = Utc::now();
                }
                other => {
                    return Err(JobError::InvalidStatus {
                        job_id: job_id.to_string(),
                        current_status: other.as_str().to_string(),
                        operation: "run".to_string(),
                    });
                }
            }
        }

        // Lock is not held across the run; the job is mutated only at the
        // entry/exit instants above and below.
        let outcome = executor().await;

        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(job_id) else {
            // Swept mid-run should be impossible (sweep skips Running jobs);
            // surface it loudly if it ever happens.
            warn!(job_id = %job_id, "Job vanished from store during execution");
            return Err(JobError::NotFound(job_id.to_string()));
        };

        match &outcome {
            Ok(result) => {
                if job.status == JobStatus::Canceled {
                    // The run raced a cancellation; keep the mark, drop the result.
                    info!(job_id = %job_id, "Run finished after cancellation, result discarded");
                } else {
                    job.status = JobStatus::Completed;
                    job.result = Some(result.clone());
                    job.progress = Some(JobProgress {
                        message: "Profile ready".to_string(),
                        percentage: 100,
                    });
                    metrics::JOBS_COMPLETED.inc();
                }
            }
            Err(e) => {
                if job.status == JobStatus::Canceled {
                    info!(job_id = %job_id, "Run failed after cancellation, error discarded");
                } else {
                    job.status = JobStatus::Failed;
                    job.error = Some(e.to_string());
                    metrics::JOBS_FAILED.inc();
                }
            }
        }
        job.updated_at = Utc::now();

        outcome
    }

    /// Best-effort progress update; no-op when the job is missing or
    /// already terminal. Percentage never decreases within a run.
    pub async fn update_progress(&self, job_id: &str, message: &str, percentage: u8) {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(job_id) else {
            return;
        };
        if job.status.is_terminal() {
            return;
        }

        let floor = job.progress.as_ref().map(|p| p.percentage).unwrap_or(0);
        job.progress = Some(JobProgress {
            message: message.to_string(),
            percentage: percentage.max(floor).min(100),
        });
        job.updated_at = Utc::now();
    }

    /// Mark a job canceled. Succeeds only from `Queued` or `Running`.
    ///
    /// Cancellation is cooperative: the in-flight run is not interrupted,
    /// it stops at its next stage boundary.
    pub async fn cancel_job(&self, job_id: &str) -> bool {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(job_id) else {
            return false;
        };
        if !job.status.is_active() {
            return false;
        }

        job.status = JobStatus::Canceled;
        job.updated_at = Utc::now();
        metrics::JOBS_CANCELED.inc();
        info!(job_id = %job_id, "Job canceled");
        true
    }

    /// Remove jobs whose `updated_at` is older than `retention` and that are
    /// not currently running. Returns the number of removed jobs.
    pub async fn sweep_expired(&self, retention: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::hours(1));

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| job.status == JobStatus::Running || job.updated_at > cutoff);
        let removed = before - jobs.len();

        if removed > 0 {
            info!(removed = removed, "Swept expired jobs");
            metrics::JOBS_SWEPT.inc_by(removed as u64);
        }
        removed
    }

    /// Current job count per status, for gauges and the status endpoint.
    pub async fn count_by_status(&self) -> HashMap<&'static str, usize> {
        let jobs = self.jobs.read().await;
        let mut counts = HashMap::new();
        for job in jobs.values() {
            *counts.entry(job.status.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ConsolidatedOutput;

    fn empty_output() -> ConsolidatedOutput {
        ConsolidatedOutput {
            all_content: vec![],
            total_pieces: 0,
            source_reports: vec![],
            artifact: crate::export::ArtifactReference::placeholder("test"),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = JobStore::new();
        let id = store.create_job().await;

        let job = store.get_job(&id).await.unwrap();
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_job() {
        let store = JobStore::new();
        assert!(store.get_job("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let store = JobStore::new();
        let id = store.create_job().await;

        let mut snapshot = store.get_job(&id).await.unwrap();
        snapshot.status = JobStatus::Failed;

        assert_eq!(store.get_job(&id).await.unwrap().status, JobStatus::Queued);
    }

    #[tokio::test]
    async fn test_process_job_success() {
        let store = JobStore::new();
        let id = store.create_job().await;

        let result = store.process_job(&id, || async { Ok(empty_output()) }).await;
        assert!(result.is_ok());

        let job = store.get_job(&id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.result.is_some());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn test_process_job_failure_recorded_and_returned() {
        let store = JobStore::new();
        let id = store.create_job().await;

        let result = store
            .process_job(&id, || async {
                Err(JobError::ExecutionFailed("boom".to_string()))
            })
            .await;
        assert!(result.is_err());

        let job = store.get_job(&id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("job execution failed: boom"));
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn test_process_job_rejects_second_run() {
        let store = JobStore::new();
        let id = store.create_job().await;

        store
            .process_job(&id, || async { Ok(empty_output()) })
            .await
            .unwrap();

        // Terminal job cannot run again.
        let result = store.process_job(&id, || async { Ok(empty_output()) }).await;
        assert!(matches!(result, Err(JobError::InvalidStatus { .. })));
    }

    #[tokio::test]
    async fn test_cancel_queued_and_running_only() {
        let store = JobStore::new();
        let id = store.create_job().await;

        assert!(store.cancel_job(&id).await);
        assert_eq!(store.get_job(&id).await.unwrap().status, JobStatus::Canceled);

        // Already canceled: returns false, status unchanged.
        assert!(!store.cancel_job(&id).await);
        assert_eq!(store.get_job(&id).await.unwrap().status, JobStatus::Canceled);
    }

    #[tokio::test]
    async fn test_cancel_completed_returns_false() {
        let store = JobStore::new();
        let id = store.create_job().await;
        store
            .process_job(&id, || async { Ok(empty_output()) })
            .await
            .unwrap();

        assert!(!store.cancel_job(&id).await);
        assert_eq!(
            store.get_job(&id).await.unwrap().status,
            JobStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_cancel_missing_returns_false() {
        let store = JobStore::new();
        assert!(!store.cancel_job("nope").await);
    }

    #[tokio::test]
    async fn test_cancellation_mark_survives_late_completion() {
        let store = JobStore::new();
        let id = store.create_job().await;

        let id_inner = id.clone();
        let result = store
            .process_job(&id, || async {
                // Cancellation lands while the run is in flight.
                store.cancel_job(&id_inner).await;
                Ok(empty_output())
            })
            .await;
        assert!(result.is_ok());

        let job = store.get_job(&id).await.unwrap();
        assert_eq!(job.status, JobStatus::Canceled);
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let store = JobStore::new();
        let id = store.create_job().await;

        store.update_progress(&id, "collecting", 30).await;
        store.update_progress(&id, "late message", 10).await;

        let progress = store.get_job(&id).await.unwrap().progress.unwrap();
        assert_eq!(progress.percentage, 30);
        assert_eq!(progress.message, "late message");
    }

    #[tokio::test]
    async fn test_progress_noop_for_missing_or_terminal() {
        let store = JobStore::new();
        // Missing: must not panic.
        store.update_progress("nope", "msg", 50).await;

        let id = store.create_job().await;
        store
            .process_job(&id, || async { Ok(empty_output()) })
            .await
            .unwrap();

        let before = store.get_job(&id).await.unwrap();
        store.update_progress(&id, "too late", 5).await;
        let after = store.get_job(&id).await.unwrap();
        assert_eq!(
            before.progress.as_ref().map(|p| p.percentage),
            after.progress.as_ref().map(|p| p.percentage)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_stale_terminal_jobs() {
        let store = JobStore::new();
        let id = store.create_job().await;
        store
            .process_job(&id, || async { Ok(empty_output()) })
            .await
            .unwrap();

        // Fresh job survives the sweep.
        assert_eq!(store.sweep_expired(Duration::from_secs(3600)).await, 0);
        assert!(store.get_job(&id).await.is_some());

        // Zero retention expires everything not running.
        assert_eq!(store.sweep_expired(Duration::from_secs(0)).await, 1);
        assert!(store.get_job(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_sweep_never_removes_running_job() {
        let store = JobStore::new();
        let id = store.create_job().await;

        let outcome = store
            .process_job(&id, || async {
                // Mid-execution the job is Running; a zero-retention sweep
                // must leave it in place.
                assert_eq!(store.sweep_expired(Duration::from_secs(0)).await, 0);
                Ok(empty_output())
            })
            .await;
        assert!(outcome.is_ok());
        assert!(store.get_job(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_list_jobs_newest_first() {
        let store = JobStore::new();
        let _a = store.create_job().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let b = store.create_job().await;

        let jobs = store.list_jobs().await;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, b);
    }

    #[tokio::test]
    async fn test_count_by_status() {
        let store = JobStore::new();
        let _q = store.create_job().await;
        let c = store.create_job().await;
        store
            .process_job(&c, || async { Ok(empty_output()) })
            .await
            .unwrap();

        let counts = store.count_by_status().await;
        assert_eq!(counts.get("queued"), Some(&1));
        assert_eq!(counts.get("completed"), Some(&1));
    }
}
