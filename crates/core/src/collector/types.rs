//! Types shared by all content collectors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discovery::SourceLocators;

/// Errors a collector may return. Collectors are free to fail; the fan-out
/// coordinator converts every error into a degraded [`CollectorResult`].
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Request timed out.
    #[error("collector timed out")]
    Timeout,

    /// Could not reach the collection endpoint.
    #[error("collector connection failed: {0}")]
    ConnectionFailed(String),

    /// The endpoint answered with an error or unparseable body.
    #[error("collector API error: {0}")]
    ApiError(String),
}

/// The four content source types, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Newsletter,
    Twitter,
    Linkedin,
    Blog,
}

impl SourceKind {
    /// All kinds in the fixed fan-in/merge order. Downstream consolidation
    /// depends on this order being stable regardless of completion order.
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Newsletter,
        SourceKind::Twitter,
        SourceKind::Linkedin,
        SourceKind::Blog,
    ];

    /// Stable snake_case name, used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Newsletter => "newsletter",
            SourceKind::Twitter => "twitter",
            SourceKind::Linkedin => "linkedin",
            SourceKind::Blog => "blog",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of collected content, the unit merged by consolidation.
///
/// Metadata carries the natural dedup key for the kind: `id` for tweets and
/// LinkedIn posts, `url` for newsletters and blog articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: SourceKind,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ContentItem {
    pub fn new(kind: SourceKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Context passed by value to every collector for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionContext {
    pub target_name: String,
    #[serde(default)]
    pub hints: HashMap<String, String>,
    pub sources: SourceLocators,
}

impl CollectionContext {
    /// The locator a collector of `kind` operates on. A newsletter collector
    /// falls back to the substack locator when no dedicated one is known.
    pub fn locator_for(&self, kind: SourceKind) -> Option<&str> {
        match kind {
            SourceKind::Newsletter => self
                .sources
                .newsletter
                .as_deref()
                .or(self.sources.substack.as_deref()),
            SourceKind::Twitter => self.sources.twitter.as_deref(),
            SourceKind::Linkedin => self.sources.linkedin.as_deref(),
            SourceKind::Blog => self.sources.blog.as_deref(),
        }
    }
}

/// Settled outcome of one collector: success, skip, or failure.
///
/// A failed or skipped result is a plain value, never an exception; it is
/// the only shape in which collector trouble crosses the coordinator
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorResult {
    pub kind: SourceKind,
    pub items: Vec<ContentItem>,
    /// No locator was available (or the collector is disabled).
    #[serde(default)]
    pub skipped: bool,
    /// The collector errored, timed out, or panicked.
    #[serde(default)]
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectorResult {
    pub fn success(kind: SourceKind, items: Vec<ContentItem>) -> Self {
        Self {
            kind,
            items,
            skipped: false,
            failed: false,
            error: None,
        }
    }

    pub fn skipped(kind: SourceKind) -> Self {
        Self {
            kind,
            items: vec![],
            skipped: true,
            failed: false,
            error: None,
        }
    }

    pub fn failed(kind: SourceKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            items: vec![],
            skipped: false,
            failed: true,
            error: Some(error.into()),
        }
    }
}
