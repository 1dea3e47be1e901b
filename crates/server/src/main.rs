mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voiceprint_core::{
    collector::{Collector, HttpCollector, SourceKind},
    discovery::{SourceDiscovery, WebDiscovery},
    export::FsExporter,
    load_config, validate_config, CollectorSet, Config, JobStore, PipelineExecutor,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Margin added on top of the slowest collector endpoint timeout, so the
/// endpoint's own timeout fires before the coordinator's.
const COLLECT_TIMEOUT_MARGIN_SECS: u64 = 5;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("VOICEPRINT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    // Log a config hash so deployments can be told apart in logs.
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );

    // Create job store
    let store = Arc::new(JobStore::new());
    info!("Job store initialized");

    // Create discovery backend if configured
    let discovery: Option<Arc<dyn SourceDiscovery>> = match &config.discovery {
        Some(discovery_config) => {
            info!(
                "Initializing web discovery at {}",
                discovery_config.endpoint
            );
            Some(Arc::new(
                WebDiscovery::new(discovery_config.clone())
                    .context("Failed to create discovery backend")?,
            ))
        }
        None => {
            info!("No discovery configured, runs will rely on hints");
            None
        }
    };

    // Create the four collectors
    let collectors = Arc::new(build_collector_set(&config)?);
    for kind in SourceKind::ALL {
        let endpoint = match kind {
            SourceKind::Newsletter => &config.collectors.newsletter,
            SourceKind::Twitter => &config.collectors.twitter,
            SourceKind::Linkedin => &config.collectors.linkedin,
            SourceKind::Blog => &config.collectors.blog,
        };
        if endpoint.enabled {
            info!("Collector {} enabled at {}", kind, endpoint.url);
        } else {
            info!("Collector {} disabled", kind);
        }
    }

    // Create artifact exporter
    let exporter = Arc::new(FsExporter::new(config.export.output_dir.clone()));
    info!("Exporting dossiers to {:?}", config.export.output_dir);

    // Create pipeline executor
    let executor = Arc::new(PipelineExecutor::new(
        Arc::clone(&store),
        discovery,
        collectors,
        exporter,
    ));

    // Spawn the retention sweeper
    let retention = Duration::from_secs(config.jobs.retention_secs);
    let sweep_interval = Duration::from_secs(config.jobs.sweep_interval_secs);
    let sweep_store = Arc::clone(&store);
    let sweeper = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep_store.sweep_expired(retention).await;
        }
    });
    info!(
        "Retention sweeper started (retention: {}s, interval: {}s)",
        retention.as_secs(),
        sweep_interval.as_secs()
    );

    // Create app state and router
    let state = Arc::new(AppState::new(config.clone(), store, executor));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    sweeper.abort();

    Ok(())
}

/// Build the four-collector set from configuration, with a coordinator
/// timeout slightly above the slowest endpoint timeout.
fn build_collector_set(config: &Config) -> Result<CollectorSet> {
    let build = |kind: SourceKind,
                 endpoint: &voiceprint_core::config::CollectorEndpointConfig|
     -> Result<Arc<dyn Collector>> {
        Ok(Arc::new(
            HttpCollector::new(kind, endpoint.clone())
                .with_context(|| format!("Failed to create {} collector", kind))?,
        ))
    };

    let max_timeout = [
        &config.collectors.newsletter,
        &config.collectors.twitter,
        &config.collectors.linkedin,
        &config.collectors.blog,
    ]
    .iter()
    .map(|endpoint| endpoint.timeout_secs)
    .max()
    .unwrap_or(30);

    Ok(CollectorSet::new(
        build(SourceKind::Newsletter, &config.collectors.newsletter)?,
        build(SourceKind::Twitter, &config.collectors.twitter)?,
        build(SourceKind::Linkedin, &config.collectors.linkedin)?,
        build(SourceKind::Blog, &config.collectors.blog)?,
    )
    .with_collect_timeout(Duration::from_secs(
        max_timeout + COLLECT_TIMEOUT_MARGIN_SECS,
    )))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
