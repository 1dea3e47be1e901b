//! Mock artifact exporter for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collector::ContentItem;
use crate::export::{ArtifactExporter, ArtifactReference, ExportError};

/// A recorded export for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedExport {
    pub target_name: String,
    pub piece_count: usize,
}

/// Mock implementation of the [`ArtifactExporter`] trait.
pub struct MockExporter {
    fails: bool,
    exports: Arc<RwLock<Vec<RecordedExport>>>,
}

impl MockExporter {
    pub fn new() -> Self {
        Self {
            fails: false,
            exports: Arc::new(RwLock::new(vec![])),
        }
    }

    /// Fail every export call.
    pub fn failing(mut self) -> Self {
        self.fails = true;
        self
    }

    pub async fn recorded_exports(&self) -> Vec<RecordedExport> {
        self.exports.read().await.clone()
    }
}

impl Default for MockExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactExporter for MockExporter {
    async fn export(
        &self,
        target_name: &str,
        content: &[ContentItem],
    ) -> Result<ArtifactReference, ExportError> {
        self.exports.write().await.push(RecordedExport {
            target_name: target_name.to_string(),
            piece_count: content.len(),
        });

        if self.fails {
            return Err(ExportError::InvalidOutputDir(
                "mock exporter configured to fail".to_string(),
            ));
        }
        Ok(ArtifactReference::at(format!(
            "mock://dossiers/{}",
            target_name.to_lowercase().replace(' ', "-")
        )))
    }
}
