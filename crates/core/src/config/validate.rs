use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Sweep interval is not 0
/// - Enabled collectors and discovery have a non-empty endpoint
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.jobs.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "jobs.sweep_interval_secs cannot be 0".to_string(),
        ));
    }

    if let Some(discovery) = &config.discovery {
        if discovery.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "discovery.endpoint cannot be empty".to_string(),
            ));
        }
    }

    let endpoints = [
        ("newsletter", &config.collectors.newsletter),
        ("twitter", &config.collectors.twitter),
        ("linkedin", &config.collectors.linkedin),
        ("blog", &config.collectors.blog),
    ];
    for (name, endpoint) in endpoints {
        if endpoint.enabled && endpoint.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "collectors.{}.url cannot be empty when enabled",
                name
            )));
        }
    }

    Ok(())
}
