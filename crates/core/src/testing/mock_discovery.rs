//! Mock source discovery for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::discovery::{
    DiscoveredSources, DiscoveryContext, DiscoveryError, SourceDiscovery, SourceLocators,
};

/// Mock implementation of the [`SourceDiscovery`] trait.
pub struct MockDiscovery {
    locators: SourceLocators,
    fails: bool,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockDiscovery {
    /// Resolve every subject to the given locators.
    pub fn resolving(locators: SourceLocators) -> Self {
        Self {
            locators,
            fails: false,
            calls: Arc::new(RwLock::new(vec![])),
        }
    }

    /// Resolve every subject to no locators at all.
    pub fn empty() -> Self {
        Self::resolving(SourceLocators::default())
    }

    /// Fail every call.
    pub fn failing() -> Self {
        Self {
            locators: SourceLocators::default(),
            fails: true,
            calls: Arc::new(RwLock::new(vec![])),
        }
    }

    /// Subject names this discovery was called with.
    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl SourceDiscovery for MockDiscovery {
    fn name(&self) -> &str {
        "mock"
    }

    async fn discover(
        &self,
        ctx: &DiscoveryContext,
    ) -> Result<DiscoveredSources, DiscoveryError> {
        self.calls.write().await.push(ctx.target_name.clone());

        if self.fails {
            return Err(DiscoveryError::ConnectionFailed(
                "mock discovery configured to fail".to_string(),
            ));
        }
        Ok(DiscoveredSources {
            locators: self.locators.clone(),
            diagnostics: None,
        })
    }
}
