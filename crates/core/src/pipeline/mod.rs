//! The collection pipeline: fan-out, consolidation, and the executor that
//! drives them against the job store.

mod consolidate;
mod executor;
mod fanout;
mod types;

pub use consolidate::{consolidate, dedup_key, normalize_url};
pub use executor::{PipelineExecutor, ProfileRequest};
pub use fanout::CollectorSet;
pub use types::{ConsolidatedOutput, PipelineError, SourceReport};
