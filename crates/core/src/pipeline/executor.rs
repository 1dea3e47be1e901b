//! Pipeline executor: discovery, fan-out collection, consolidation.
//!
//! The executor owns one run end to end and reports through the job store.
//! Its error surface is deliberately small: discovery failures and collector
//! failures degrade the result, only a consolidation failure fails the job.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::collector::CollectionContext;
use crate::discovery::{DiscoveryContext, SourceDiscovery, SourceLocators};
use crate::export::ArtifactExporter;
use crate::job::{JobError, JobStatus, JobStore};
use crate::metrics;

use super::consolidate::consolidate;
use super::fanout::CollectorSet;
use super::types::ConsolidatedOutput;

// Progress milestones reported while a run is in flight. They mark which
// stage the run has entered, not how much work is done; the store keeps them
// monotonic and completion pins 100.
const PROGRESS_DISCOVERY: u8 = 10;
const PROGRESS_COLLECTING: u8 = 30;
const PROGRESS_CONSOLIDATING: u8 = 80;

/// Terminal disposition of a run as observed in the store. A cancellation
/// mark outranks whatever the run returned; it is a normal ending, not a
/// failure, and drives both the duration metric label and the closing log.
fn result_label(
    status: Option<JobStatus>,
    outcome: &Result<ConsolidatedOutput, JobError>,
) -> &'static str {
    match status {
        Some(JobStatus::Canceled) => "canceled",
        _ if outcome.is_ok() => "completed",
        _ => "failed",
    }
}

/// What a single run profiles: a subject name plus optional per-source hints.
#[derive(Debug, Clone)]
pub struct ProfileRequest {
    pub target_name: String,
    pub hints: HashMap<String, String>,
}

/// Drives pipeline runs against the shared job store.
pub struct PipelineExecutor {
    store: Arc<JobStore>,
    discovery: Option<Arc<dyn SourceDiscovery>>,
    collectors: Arc<CollectorSet>,
    exporter: Arc<dyn ArtifactExporter>,
}

impl PipelineExecutor {
    pub fn new(
        store: Arc<JobStore>,
        discovery: Option<Arc<dyn SourceDiscovery>>,
        collectors: Arc<CollectorSet>,
        exporter: Arc<dyn ArtifactExporter>,
    ) -> Self {
        Self {
            store,
            discovery,
            collectors,
            exporter,
        }
    }

    /// Launch a run for an already-created job and return immediately.
    ///
    /// The spawned task is the error boundary: whatever `process_job`
    /// returns has already been recorded in the store, so here it is only
    /// logged.
    pub fn spawn(self: &Arc<Self>, job_id: String, request: ProfileRequest) {
        let executor = Arc::clone(self);
        tokio::spawn(async move {
            let started = Instant::now();
            let run_store = Arc::clone(&executor.store);
            let run_id = job_id.clone();
            let run_request = request.clone();

            let outcome = run_store
                .process_job(&job_id, || executor.run(run_id, run_request))
                .await;

            let status = executor.store.get_job(&job_id).await.map(|job| job.status);
            let label = result_label(status, &outcome);
            metrics::PIPELINE_DURATION
                .with_label_values(&[label])
                .observe(started.elapsed().as_secs_f64());

            match (label, outcome) {
                ("canceled", _) => {
                    info!(
                        job_id = %job_id,
                        target_name = %request.target_name,
                        "Pipeline run canceled"
                    );
                }
                (_, Ok(output)) => {
                    info!(
                        job_id = %job_id,
                        target_name = %request.target_name,
                        pieces = output.total_pieces,
                        "Pipeline run finished"
                    );
                }
                (_, Err(e)) => {
                    error!(job_id = %job_id, error = %e, "Pipeline run failed");
                }
            }
        });
    }

    /// True when a cancellation mark landed on the job. Checked at stage
    /// boundaries only; an in-flight stage always runs to completion.
    async fn is_canceled(&self, job_id: &str) -> bool {
        matches!(
            self.store.get_job(job_id).await,
            Some(job) if job.status == JobStatus::Canceled
        )
    }

    /// Execute the three pipeline stages for one job.
    pub async fn run(
        &self,
        job_id: String,
        request: ProfileRequest,
    ) -> Result<ConsolidatedOutput, JobError> {
        info!(job_id = %job_id, target_name = %request.target_name, "Pipeline run started");

        self.store
            .update_progress(&job_id, "Discovering sources", PROGRESS_DISCOVERY)
            .await;
        let locators = self.discover(&request).await;

        if self.is_canceled(&job_id).await {
            return Err(JobError::ExecutionFailed("run canceled".to_string()));
        }

        self.store
            .update_progress(&job_id, "Collecting content", PROGRESS_COLLECTING)
            .await;
        let ctx = CollectionContext {
            target_name: request.target_name.clone(),
            hints: request.hints.clone(),
            sources: locators,
        };
        let results = self.collectors.collect_all(&job_id, &ctx).await;

        if self.is_canceled(&job_id).await {
            return Err(JobError::ExecutionFailed("run canceled".to_string()));
        }

        self.store
            .update_progress(&job_id, "Consolidating content", PROGRESS_CONSOLIDATING)
            .await;
        consolidate(&request.target_name, &results, self.exporter.as_ref())
            .await
            .map_err(|e| JobError::ExecutionFailed(e.to_string()))
    }

    /// Resolve source locators, folding every failure mode into an empty
    /// set so the run proceeds on hints alone.
    async fn discover(&self, request: &ProfileRequest) -> SourceLocators {
        let resolved = match &self.discovery {
            None => {
                metrics::DISCOVERY_CALLS
                    .with_label_values(&["unconfigured"])
                    .inc();
                SourceLocators::default()
            }
            Some(discovery) => {
                let ctx = DiscoveryContext {
                    target_name: request.target_name.clone(),
                    hints: request.hints.clone(),
                };
                match discovery.discover(&ctx).await {
                    Ok(discovered) => {
                        let label = if discovered.locators.is_empty() {
                            "empty"
                        } else {
                            "success"
                        };
                        metrics::DISCOVERY_CALLS.with_label_values(&[label]).inc();
                        discovered.locators
                    }
                    Err(e) => {
                        warn!(
                            target_name = %request.target_name,
                            error = %e,
                            "Discovery failed, proceeding with hints only"
                        );
                        metrics::DISCOVERY_CALLS.with_label_values(&["failed"]).inc();
                        SourceLocators::default()
                    }
                }
            }
        };

        resolved.overlay_hints(&request.hints)
    }
}
