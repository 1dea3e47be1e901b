//! Artifact export.
//!
//! Consolidation hands the merged content list to an exporter that produces
//! a durable artifact (a style dossier document). Export failure is absorbed
//! by consolidation and replaced with a placeholder reference; it never
//! fails the pipeline.

mod fs;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collector::ContentItem;

pub use fs::FsExporter;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem trouble writing the artifact.
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),

    /// The output location is not usable.
    #[error("invalid output directory: {0}")]
    InvalidOutputDir(String),
}

/// Reference to an exported artifact, or a placeholder when export failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReference {
    /// Location of the artifact (file path or URL), when export succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// True when export failed and this reference is a stand-in.
    #[serde(default)]
    pub placeholder: bool,
    /// Why the placeholder was substituted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ArtifactReference {
    pub fn at(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            placeholder: false,
            note: None,
        }
    }

    pub fn placeholder(note: impl Into<String>) -> Self {
        Self {
            location: None,
            placeholder: true,
            note: Some(note.into()),
        }
    }
}

/// Trait for artifact exporters.
#[async_trait]
pub trait ArtifactExporter: Send + Sync {
    /// Export the merged content for `target_name` and return a reference
    /// to the created artifact.
    async fn export(
        &self,
        target_name: &str,
        content: &[ContentItem],
    ) -> Result<ArtifactReference, ExportError>;
}
