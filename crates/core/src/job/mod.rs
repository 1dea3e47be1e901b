//! Job lifecycle subsystem.
//!
//! A job represents one pipeline execution. The [`JobStore`] owns every job
//! record; everything else (HTTP handlers, the pipeline executor) holds only
//! the job id and goes through the store's API.

mod store;
mod types;

pub use store::JobStore;
pub use types::{Job, JobError, JobProgress, JobStatus};
