//! Mock collector for testing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collector::{
    CollectionContext, Collector, CollectorError, ContentItem, SourceKind,
};

type ErrorFactory = Box<dyn Fn() -> CollectorError + Send + Sync>;

/// Mock implementation of the [`Collector`] trait.
///
/// Builder-style configuration: items to return, an error to fail with, a
/// delay before answering, a panic, or a disabled switch. Calls are recorded
/// for assertions.
pub struct MockCollector {
    kind: SourceKind,
    items: Vec<ContentItem>,
    error: Option<ErrorFactory>,
    delay: Option<Duration>,
    panics: bool,
    enabled: bool,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockCollector {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            items: vec![],
            error: None,
            delay: None,
            panics: false,
            enabled: true,
            calls: Arc::new(RwLock::new(vec![])),
        }
    }

    /// Return these items on every call.
    pub fn with_items(mut self, items: Vec<ContentItem>) -> Self {
        self.items = items;
        self
    }

    /// Fail every call with the error the factory produces.
    pub fn with_error<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> CollectorError + Send + Sync + 'static,
    {
        self.error = Some(Box::new(factory));
        self
    }

    /// Sleep before answering, to simulate a slow backend.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Panic on every call, to exercise panic containment.
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    /// Report as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Session ids this collector was called with.
    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl Collector for MockCollector {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn collect(
        &self,
        session_id: &str,
        _ctx: &CollectionContext,
    ) -> Result<Vec<ContentItem>, CollectorError> {
        self.calls.write().await.push(session_id.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panics {
            panic!("mock collector configured to panic");
        }
        if let Some(factory) = &self.error {
            return Err(factory());
        }
        Ok(self.items.clone())
    }
}
