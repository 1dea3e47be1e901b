//! Filesystem dossier exporter.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::collector::{ContentItem, SourceKind};

use super::{ArtifactExporter, ArtifactReference, ExportError};

/// Exporter that writes a Markdown dossier under a configured directory.
pub struct FsExporter {
    output_dir: PathBuf,
}

impl FsExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// File-safe slug of a subject name.
    fn slugify(name: &str) -> String {
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        let slug = slug.trim_matches('-').to_string();
        if slug.is_empty() {
            "subject".to_string()
        } else {
            slug
        }
    }

    fn render(target_name: &str, content: &[ContentItem]) -> String {
        let mut doc = String::new();
        doc.push_str(&format!("# Style dossier: {}\n\n", target_name));
        doc.push_str(&format!(
            "Generated {} from {} content pieces.\n",
            Utc::now().format("%Y-%m-%d %H:%M UTC"),
            content.len()
        ));

        for kind in SourceKind::ALL {
            let items: Vec<&ContentItem> = content.iter().filter(|i| i.kind == kind).collect();
            if items.is_empty() {
                continue;
            }
            doc.push_str(&format!("\n## {} ({})\n", kind, items.len()));
            for item in items {
                doc.push_str("\n---\n\n");
                if let Some(url) = item.metadata.get("url") {
                    doc.push_str(&format!("Source: {}\n\n", url));
                }
                doc.push_str(&item.content);
                doc.push('\n');
            }
        }
        doc
    }
}

#[async_trait]
impl ArtifactExporter for FsExporter {
    async fn export(
        &self,
        target_name: &str,
        content: &[ContentItem],
    ) -> Result<ArtifactReference, ExportError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ExportError::InvalidOutputDir(format!("{}: {}", self.output_dir.display(), e)))?;

        let filename = format!(
            "{}-{}.md",
            Self::slugify(target_name),
            Utc::now().format("%Y%m%d%H%M%S")
        );
        let path = self.output_dir.join(filename);
        let doc = Self::render(target_name, content);

        // Write to a temp name first so readers never see a partial dossier.
        let tmp = path.with_extension("md.part");
        tokio::fs::write(&tmp, doc.as_bytes()).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), pieces = content.len(), "Dossier written");
        info!(target_name = target_name, "Artifact exported");

        Ok(ArtifactReference::at(path.display().to_string()))
    }
}
