//! HTTP-backed discovery adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DiscoveryConfig;

use super::{DiscoveredSources, DiscoveryContext, DiscoveryError, SourceDiscovery, SourceLocators};

/// Discovery backend that asks a configured web-research endpoint to resolve
/// source locators for a subject name.
pub struct WebDiscovery {
    client: Client,
    config: DiscoveryConfig,
}

impl WebDiscovery {
    /// Create a new WebDiscovery with the given configuration.
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DiscoveryError::ApiError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SourceDiscovery for WebDiscovery {
    fn name(&self) -> &str {
        "web"
    }

    async fn discover(&self, ctx: &DiscoveryContext) -> Result<DiscoveredSources, DiscoveryError> {
        let url = format!("{}/resolve", self.config.endpoint.trim_end_matches('/'));
        debug!(target_name = %ctx.target_name, "Resolving source locators");

        let mut request = self.client.post(&url).json(&ResolveRequest {
            target_name: &ctx.target_name,
        });
        if let Some(ref api_key) = self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DiscoveryError::Timeout
            } else if e.is_connect() {
                DiscoveryError::ConnectionFailed(e.to_string())
            } else {
                DiscoveryError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let resolved: ResolveResponse = response
            .json()
            .await
            .map_err(|e| DiscoveryError::ApiError(format!("failed to parse response: {}", e)))?;

        let locators = SourceLocators {
            newsletter: resolved.newsletter,
            twitter: resolved.twitter,
            linkedin: resolved.linkedin,
            blog: resolved.blog,
            youtube: resolved.youtube,
            substack: resolved.substack,
        };

        debug!(
            target_name = %ctx.target_name,
            empty = locators.is_empty(),
            "Discovery complete"
        );

        Ok(DiscoveredSources {
            locators,
            diagnostics: resolved.notes,
        })
    }
}

#[derive(Debug, Serialize)]
struct ResolveRequest<'a> {
    target_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    newsletter: Option<String>,
    twitter: Option<String>,
    linkedin: Option<String>,
    blog: Option<String>,
    youtube: Option<String>,
    substack: Option<String>,
    notes: Option<String>,
}
