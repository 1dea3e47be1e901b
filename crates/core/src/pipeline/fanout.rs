//! Fan-out/fan-in coordination of the four collectors.
//!
//! The coordinator launches all collectors concurrently and waits for every
//! one of them to settle. Its central invariant: one slow or broken source
//! can never take down the run or the other three sources' results. Errors,
//! timeouts and panics are all converted into degraded result values; the
//! fan-in itself cannot fail.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::collector::{CollectionContext, Collector, CollectorResult, SourceKind};
use crate::metrics;

/// Coordinator timeout used when no override is configured.
const DEFAULT_COLLECT_TIMEOUT: Duration = Duration::from_secs(60);

/// The four collectors of one pipeline, held in fixed kind order.
pub struct CollectorSet {
    collectors: Vec<Arc<dyn Collector>>,
    collect_timeout: Duration,
}

impl CollectorSet {
    /// Build a set from exactly one collector per source kind.
    pub fn new(
        newsletter: Arc<dyn Collector>,
        twitter: Arc<dyn Collector>,
        linkedin: Arc<dyn Collector>,
        blog: Arc<dyn Collector>,
    ) -> Self {
        debug_assert_eq!(newsletter.kind(), SourceKind::Newsletter);
        debug_assert_eq!(twitter.kind(), SourceKind::Twitter);
        debug_assert_eq!(linkedin.kind(), SourceKind::Linkedin);
        debug_assert_eq!(blog.kind(), SourceKind::Blog);

        Self {
            collectors: vec![newsletter, twitter, linkedin, blog],
            collect_timeout: DEFAULT_COLLECT_TIMEOUT,
        }
    }

    /// Override the per-collector timeout the coordinator enforces.
    pub fn with_collect_timeout(mut self, timeout: Duration) -> Self {
        self.collect_timeout = timeout;
        self
    }

    /// Run all four collectors concurrently and fan in once every one has
    /// settled. Always returns exactly four results, in fixed kind order
    /// (newsletter, twitter, linkedin, blog), regardless of completion
    /// order or outcome.
    pub async fn collect_all(
        &self,
        session_id: &str,
        ctx: &CollectionContext,
    ) -> Vec<CollectorResult> {
        let mut handles = Vec::with_capacity(self.collectors.len());

        for collector in &self.collectors {
            let kind = collector.kind();

            // Skip without spawning when there is nothing to collect from.
            if !collector.enabled() || ctx.locator_for(kind).is_none() {
                debug!(kind = %kind, "Collector skipped, no locator");
                handles.push(None);
                continue;
            }

            let collector = Arc::clone(collector);
            let ctx = ctx.clone();
            let session_id = session_id.to_string();
            let timeout = self.collect_timeout;

            // Each collector runs on its own task so a panic is contained
            // as a JoinError instead of unwinding through the fan-in.
            handles.push(Some(tokio::spawn(async move {
                tokio::time::timeout(timeout, collector.collect(&session_id, &ctx)).await
            })));
        }

        // Settle every task before folding; a skipped slot settles at once.
        let settled = join_all(handles.into_iter().map(|handle| async move {
            match handle {
                None => None,
                Some(handle) => Some(handle.await),
            }
        }))
        .await;

        let mut results = Vec::with_capacity(self.collectors.len());
        for (collector, settled) in self.collectors.iter().zip(settled) {
            let kind = collector.kind();
            let result = match settled {
                None => CollectorResult::skipped(kind),
                Some(Ok(Ok(Ok(items)))) => {
                    debug!(kind = %kind, items = items.len(), "Collector succeeded");
                    CollectorResult::success(kind, items)
                }
                Some(Ok(Ok(Err(e)))) => {
                    warn!(kind = %kind, error = %e, "Collector failed");
                    CollectorResult::failed(kind, e.to_string())
                }
                Some(Ok(Err(_elapsed))) => {
                    warn!(kind = %kind, "Collector timed out");
                    CollectorResult::failed(kind, "collector timed out")
                }
                Some(Err(join_err)) => {
                    warn!(kind = %kind, error = %join_err, "Collector task panicked");
                    CollectorResult::failed(kind, format!("collector panicked: {}", join_err))
                }
            };

            let outcome = if result.skipped {
                "skipped"
            } else if result.failed {
                "failed"
            } else {
                "success"
            };
            metrics::COLLECTOR_OUTCOMES
                .with_label_values(&[kind.as_str(), outcome])
                .inc();

            results.push(result);
        }

        results
    }
}
