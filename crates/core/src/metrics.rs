//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Job lifecycle (created, completed, failed, canceled, swept)
//! - Collectors (per-kind outcomes)
//! - Discovery and export calls
//! - Pipeline run duration

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Lifecycle Metrics
// =============================================================================

/// Jobs created total.
pub static JOBS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("voiceprint_jobs_created_total", "Total jobs created").unwrap()
});

/// Jobs completed total.
pub static JOBS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "voiceprint_jobs_completed_total",
        "Total jobs completed successfully",
    )
    .unwrap()
});

/// Jobs failed total.
pub static JOBS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("voiceprint_jobs_failed_total", "Total jobs that failed").unwrap()
});

/// Jobs canceled total.
pub static JOBS_CANCELED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("voiceprint_jobs_canceled_total", "Total jobs canceled").unwrap()
});

/// Jobs removed by the retention sweep.
pub static JOBS_SWEPT: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "voiceprint_jobs_swept_total",
        "Total jobs removed by the retention sweep",
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Pipeline run duration in seconds.
pub static PIPELINE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "voiceprint_pipeline_duration_seconds",
            "Duration of pipeline runs",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"], // "completed", "failed", "canceled"
    )
    .unwrap()
});

/// Collector outcomes by kind and result.
pub static COLLECTOR_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "voiceprint_collector_outcomes_total",
            "Collector outcomes per source kind",
        ),
        &["kind", "result"], // result: "success", "skipped", "failed"
    )
    .unwrap()
});

/// Content pieces kept after deduplication, per source kind.
pub static CONTENT_PIECES: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "voiceprint_content_pieces",
            "Content pieces kept after deduplication per run",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
        &["kind"],
    )
    .unwrap()
});

/// Duplicates dropped by consolidation.
pub static DUPLICATES_DROPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "voiceprint_duplicates_dropped_total",
        "Content items dropped as duplicates",
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// Discovery calls by result.
pub static DISCOVERY_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("voiceprint_discovery_calls_total", "Total discovery calls"),
        &["result"], // "success", "empty", "failed", "unconfigured"
    )
    .unwrap()
});

/// Artifact export calls by result.
pub static EXPORT_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "voiceprint_export_calls_total",
            "Total artifact export calls",
        ),
        &["result"], // "success", "placeholder"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_CREATED.clone()),
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(JOBS_FAILED.clone()),
        Box::new(JOBS_CANCELED.clone()),
        Box::new(JOBS_SWEPT.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(COLLECTOR_OUTCOMES.clone()),
        Box::new(CONTENT_PIECES.clone()),
        Box::new(DUPLICATES_DROPPED.clone()),
        Box::new(DISCOVERY_CALLS.clone()),
        Box::new(EXPORT_CALLS.clone()),
    ]
}
