//! Types for the pipeline executor and consolidation stages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collector::{ContentItem, SourceKind};
use crate::export::ArtifactReference;

/// Errors that terminate a pipeline run.
///
/// Degraded sources never surface here; this is the hard-failure path only.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Consolidation could not produce a mergeable output.
    #[error("consolidation failed: {0}")]
    Consolidation(String),
}

/// Per-source annotation carried inside the final result, so a caller can
/// judge how degraded a completed run is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub kind: SourceKind,
    /// Items contributed after deduplication.
    pub collected: usize,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The consolidated pipeline output. Created once per run, immutable
/// thereafter; becomes the job's `result`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedOutput {
    /// Merged, deduplicated content in fixed source order.
    pub all_content: Vec<ContentItem>,
    pub total_pieces: usize,
    /// One report per source type, in fixed order.
    pub source_reports: Vec<SourceReport>,
    pub artifact: ArtifactReference,
}
