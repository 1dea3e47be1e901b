pub mod collector;
pub mod config;
pub mod discovery;
pub mod export;
pub mod job;
pub mod metrics;
pub mod pipeline;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use job::{Job, JobError, JobProgress, JobStatus, JobStore};
pub use pipeline::{
    CollectorSet, ConsolidatedOutput, PipelineError, PipelineExecutor, ProfileRequest,
    SourceReport,
};
