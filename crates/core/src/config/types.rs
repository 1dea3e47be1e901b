use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    /// Discovery backend; when absent, runs proceed on hints alone.
    #[serde(default)]
    pub discovery: Option<DiscoveryConfig>,
    #[serde(default)]
    pub collectors: CollectorsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Job retention configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobsConfig {
    /// How long finished jobs stay queryable (default: 1 hour)
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    /// How often the retention sweep runs (default: 60s)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_retention_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// Discovery backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    /// Discovery endpoint URL (e.g., "http://localhost:9200")
    pub endpoint: String,
    /// Optional bearer token for the endpoint
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// One extraction endpoint per source kind.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CollectorsConfig {
    #[serde(default)]
    pub newsletter: CollectorEndpointConfig,
    #[serde(default)]
    pub twitter: CollectorEndpointConfig,
    #[serde(default)]
    pub linkedin: CollectorEndpointConfig,
    #[serde(default)]
    pub blog: CollectorEndpointConfig,
}

/// Extraction endpoint configuration for a single collector
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectorEndpointConfig {
    /// Extraction endpoint URL (e.g., "http://localhost:9301")
    pub url: String,
    /// Optional bearer token for the endpoint
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for CollectorEndpointConfig {
    // An unconfigured collector: no endpoint, disabled.
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            timeout_secs: default_timeout(),
            enabled: false,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_enabled() -> bool {
    true
}

/// Artifact export configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Directory dossiers are written under (default: "dossiers")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dossiers")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub jobs: JobsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<SanitizedEndpointConfig>,
    pub collectors: SanitizedCollectorsConfig,
    pub export: ExportConfig,
}

/// Sanitized endpoint config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedEndpointConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCollectorsConfig {
    pub newsletter: SanitizedEndpointConfig,
    pub twitter: SanitizedEndpointConfig,
    pub linkedin: SanitizedEndpointConfig,
    pub blog: SanitizedEndpointConfig,
}

impl From<&CollectorEndpointConfig> for SanitizedEndpointConfig {
    fn from(config: &CollectorEndpointConfig) -> Self {
        Self {
            url: config.url.clone(),
            api_key_configured: config.api_key.as_deref().is_some_and(|k| !k.is_empty()),
            timeout_secs: config.timeout_secs,
            enabled: config.enabled,
        }
    }
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            jobs: config.jobs.clone(),
            discovery: config.discovery.as_ref().map(|d| SanitizedEndpointConfig {
                url: d.endpoint.clone(),
                api_key_configured: d.api_key.as_deref().is_some_and(|k| !k.is_empty()),
                timeout_secs: d.timeout_secs,
                enabled: true,
            }),
            collectors: SanitizedCollectorsConfig {
                newsletter: (&config.collectors.newsletter).into(),
                twitter: (&config.collectors.twitter).into(),
                linkedin: (&config.collectors.linkedin).into(),
                blog: (&config.collectors.blog).into(),
            },
            export: config.export.clone(),
        }
    }
}
