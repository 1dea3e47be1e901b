//! Source discovery for a subject.
//!
//! Discovery runs once per job, before any collector, and resolves where a
//! subject publishes: newsletter, Twitter handle, LinkedIn profile, blog and
//! so on. User-supplied hints always override resolved locators. A discovery
//! failure degrades to empty locators at the executor boundary; it never
//! aborts the run.

mod types;
mod web;

use async_trait::async_trait;

pub use types::{DiscoveredSources, DiscoveryContext, DiscoveryError, SourceLocators};
pub use web::WebDiscovery;

/// Trait for discovery backends.
#[async_trait]
pub trait SourceDiscovery: Send + Sync {
    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Resolve source locators for the subject in `ctx`. Hints are overlaid
    /// by the caller; implementations only resolve from the target name.
    async fn discover(&self, ctx: &DiscoveryContext) -> Result<DiscoveredSources, DiscoveryError>;
}
