use std::sync::Arc;
use voiceprint_core::{Config, JobStore, PipelineExecutor, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<JobStore>,
    executor: Arc<PipelineExecutor>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<JobStore>, executor: Arc<PipelineExecutor>) -> Self {
        Self {
            config,
            store,
            executor,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn executor(&self) -> &Arc<PipelineExecutor> {
        &self.executor
    }
}
