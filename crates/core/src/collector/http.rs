//! HTTP-backed collector adapter.
//!
//! All four source types share one adapter shape: POST the collection
//! context to a per-kind extraction endpoint and parse the typed items it
//! returns. What each endpoint does to obtain content (RSS, API calls,
//! scraping) is its own concern.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CollectorEndpointConfig;
use crate::discovery::SourceLocators;

use super::{CollectionContext, Collector, CollectorError, ContentItem, SourceKind};

/// Collector that delegates extraction to a configured HTTP endpoint.
pub struct HttpCollector {
    kind: SourceKind,
    client: Client,
    config: CollectorEndpointConfig,
}

impl HttpCollector {
    /// Create a new HttpCollector for one source kind.
    pub fn new(kind: SourceKind, config: CollectorEndpointConfig) -> Result<Self, CollectorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollectorError::ApiError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            kind,
            client,
            config,
        })
    }
}

#[async_trait]
impl Collector for HttpCollector {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    async fn collect(
        &self,
        session_id: &str,
        ctx: &CollectionContext,
    ) -> Result<Vec<ContentItem>, CollectorError> {
        let url = format!("{}/collect", self.config.url.trim_end_matches('/'));
        debug!(kind = %self.kind, session_id = session_id, "Collecting content");

        let mut request = self.client.post(&url).json(&CollectRequest {
            session_id,
            kind: self.kind,
            target_name: &ctx.target_name,
            hints: &ctx.hints,
            sources: &ctx.sources,
        });
        if let Some(ref api_key) = self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CollectorError::Timeout
            } else if e.is_connect() {
                CollectorError::ConnectionFailed(e.to_string())
            } else {
                CollectorError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CollectorError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: CollectResponse = response
            .json()
            .await
            .map_err(|e| CollectorError::ApiError(format!("failed to parse response: {}", e)))?;

        debug!(
            kind = %self.kind,
            items = parsed.items.len(),
            "Collection complete"
        );

        Ok(parsed
            .items
            .into_iter()
            .map(|raw| ContentItem {
                kind: self.kind,
                content: raw.content,
                metadata: raw.metadata,
            })
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct CollectRequest<'a> {
    session_id: &'a str,
    kind: SourceKind,
    target_name: &'a str,
    hints: &'a HashMap<String, String>,
    sources: &'a SourceLocators,
}

#[derive(Debug, Deserialize)]
struct CollectResponse {
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    content: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}
