//! Types for the source discovery stage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during discovery.
///
/// The pipeline executor converts all of these into an empty-locator result;
/// discovery failure never aborts a run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Request timed out.
    #[error("discovery timed out")]
    Timeout,

    /// Could not reach the discovery endpoint.
    #[error("discovery connection failed: {0}")]
    ConnectionFailed(String),

    /// The endpoint answered with an error or unparseable body.
    #[error("discovery API error: {0}")]
    ApiError(String),
}

/// Input to discovery, fully determined at job creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryContext {
    /// Name of the subject whose writing is being profiled.
    pub target_name: String,
    /// User-supplied hints, keyed by source name (`newsletter`, `twitter`,
    /// `linkedin`, `blog`, `youtube`, `substack`). Hints always override
    /// whatever discovery resolves.
    #[serde(default)]
    pub hints: HashMap<String, String>,
}

/// Named source locators (URLs or handles) resolved for a subject.
///
/// Immutable once produced for a given run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocators {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newsletter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substack: Option<String>,
}

impl SourceLocators {
    /// True when no locator was resolved at all.
    pub fn is_empty(&self) -> bool {
        self.newsletter.is_none()
            && self.twitter.is_none()
            && self.linkedin.is_none()
            && self.blog.is_none()
            && self.youtube.is_none()
            && self.substack.is_none()
    }

    /// Overlay user hints on top of resolved locators. Hints win.
    pub fn overlay_hints(mut self, hints: &HashMap<String, String>) -> Self {
        let take = |key: &str| hints.get(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if let Some(v) = take("newsletter") {
            self.newsletter = Some(v);
        }
        if let Some(v) = take("twitter") {
            self.twitter = Some(v);
        }
        if let Some(v) = take("linkedin") {
            self.linkedin = Some(v);
        }
        if let Some(v) = take("blog") {
            self.blog = Some(v);
        }
        if let Some(v) = take("youtube") {
            self.youtube = Some(v);
        }
        if let Some(v) = take("substack") {
            self.substack = Some(v);
        }
        self
    }
}

/// Output of the discovery stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveredSources {
    pub locators: SourceLocators,
    /// Raw diagnostic text from the discovery backend, when it provides any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}
