//! Content collectors, one per source type.
//!
//! Every collector is polymorphic over the same contract: given a collection
//! context, return typed content items or an error. Collectors are not
//! required to be exception-safe — the fan-out coordinator wraps each call
//! and converts errors, timeouts and panics into degraded result values.

mod http;
mod types;

use async_trait::async_trait;

pub use http::HttpCollector;
pub use types::{
    CollectionContext, CollectorError, CollectorResult, ContentItem, SourceKind,
};

/// Trait for content collectors.
#[async_trait]
pub trait Collector: Send + Sync {
    /// The source type this collector gathers.
    fn kind(&self) -> SourceKind;

    /// Whether this collector should run at all. Disabled collectors are
    /// reported as skipped by the coordinator.
    fn enabled(&self) -> bool {
        true
    }

    /// Gather content items for the subject described by `ctx`.
    /// `session_id` is the job id, for correlation on the remote side.
    async fn collect(
        &self,
        session_id: &str,
        ctx: &CollectionContext,
    ) -> Result<Vec<ContentItem>, CollectorError>;
}
