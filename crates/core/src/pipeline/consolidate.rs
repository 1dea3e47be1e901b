//! Consolidation: merge and deduplicate collector outputs.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::collector::{CollectorResult, ContentItem, SourceKind};
use crate::export::{ArtifactExporter, ArtifactReference};
use crate::metrics;

use super::types::{ConsolidatedOutput, PipelineError, SourceReport};

/// Normalize a URL for deduplication: protocol stripped, trailing slashes
/// stripped, lowercased.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.trim_end_matches('/').to_lowercase()
}

/// The natural dedup key of an item, when it has one.
///
/// Tweets and LinkedIn posts key on their platform id; newsletters and blog
/// articles key on their normalized URL. Items without a key are never
/// deduplicated — no safe synthetic key exists for them, so they are always
/// kept.
pub fn dedup_key(item: &ContentItem) -> Option<String> {
    let key = match item.kind {
        SourceKind::Twitter | SourceKind::Linkedin => item.metadata.get("id").cloned(),
        SourceKind::Newsletter | SourceKind::Blog => {
            item.metadata.get("url").map(|u| normalize_url(u))
        }
    };
    key.filter(|k| !k.is_empty())
}

/// Merge the four collector results into one ordered, deduplicated content
/// list and export the artifact.
///
/// Merge order is the fixed source order (newsletter, twitter, linkedin,
/// blog) with each source's internal order preserved — a determinism choice,
/// not a ranking. An export failure is absorbed and replaced with a
/// placeholder reference; the only hard-failure path is a malformed fan-in.
pub async fn consolidate(
    target_name: &str,
    results: &[CollectorResult],
    exporter: &dyn ArtifactExporter,
) -> Result<ConsolidatedOutput, PipelineError> {
    // The coordinator always hands over exactly one result per kind in
    // order. Anything else is a programming defect, the one error worth
    // failing the run for.
    if results.len() != SourceKind::ALL.len()
        || results
            .iter()
            .zip(SourceKind::ALL)
            .any(|(r, kind)| r.kind != kind)
    {
        return Err(PipelineError::Consolidation(format!(
            "malformed fan-in: got {} results, kinds {:?}",
            results.len(),
            results.iter().map(|r| r.kind).collect::<Vec<_>>()
        )));
    }

    let mut seen: HashSet<(SourceKind, String)> = HashSet::new();
    let mut all_content: Vec<ContentItem> = Vec::new();
    let mut source_reports: Vec<SourceReport> = Vec::new();

    for result in results {
        let mut kept = 0usize;
        for item in &result.items {
            match dedup_key(item) {
                Some(key) => {
                    if seen.insert((item.kind, key)) {
                        all_content.push(item.clone());
                        kept += 1;
                    } else {
                        metrics::DUPLICATES_DROPPED.inc();
                    }
                }
                // No natural key: always kept.
                None => {
                    all_content.push(item.clone());
                    kept += 1;
                }
            }
        }

        metrics::CONTENT_PIECES
            .with_label_values(&[result.kind.as_str()])
            .observe(kept as f64);

        source_reports.push(SourceReport {
            kind: result.kind,
            collected: kept,
            skipped: result.skipped,
            failed: result.failed,
            error: result.error.clone(),
        });
    }

    debug!(
        target_name = target_name,
        pieces = all_content.len(),
        "Content consolidated"
    );

    // An all-skipped fan-in has nothing to dossier: no export call, a
    // placeholder reference records that no source was attempted.
    let artifact = if results.iter().all(|r| r.skipped) {
        metrics::EXPORT_CALLS
            .with_label_values(&["placeholder"])
            .inc();
        ArtifactReference::placeholder("no sources were collected")
    } else {
        export_with_fallback(target_name, &all_content, exporter).await
    };

    let total_pieces = all_content.len();
    Ok(ConsolidatedOutput {
        all_content,
        total_pieces,
        source_reports,
        artifact,
    })
}

/// Export side effect. A failure here degrades to a placeholder and must
/// never fail the stage.
async fn export_with_fallback(
    target_name: &str,
    all_content: &[ContentItem],
    exporter: &dyn ArtifactExporter,
) -> ArtifactReference {
    match exporter.export(target_name, all_content).await {
        Ok(reference) => {
            metrics::EXPORT_CALLS.with_label_values(&["success"]).inc();
            reference
        }
        Err(e) => {
            warn!(error = %e, "Artifact export failed, substituting placeholder");
            metrics::EXPORT_CALLS
                .with_label_values(&["placeholder"])
                .inc();
            ArtifactReference::placeholder(format!("export failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockExporter;

    fn item(kind: SourceKind, content: &str, meta: &[(&str, &str)]) -> ContentItem {
        let mut item = ContentItem::new(kind, content);
        for (k, v) in meta {
            item = item.with_meta(*k, *v);
        }
        item
    }

    fn results_with(items_per_kind: [Vec<ContentItem>; 4]) -> Vec<CollectorResult> {
        SourceKind::ALL
            .into_iter()
            .zip(items_per_kind)
            .map(|(kind, items)| CollectorResult::success(kind, items))
            .collect()
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("https://X.com/A/"), "x.com/a");
        assert_eq!(normalize_url("http://x.com/a"), "x.com/a");
        assert_eq!(normalize_url("x.com/a//"), "x.com/a");
        assert_eq!(normalize_url("  https://x.com  "), "x.com");
    }

    #[test]
    fn test_dedup_key_per_kind() {
        let tweet = item(SourceKind::Twitter, "t", &[("id", "123")]);
        assert_eq!(dedup_key(&tweet).as_deref(), Some("123"));

        let post = item(SourceKind::Blog, "b", &[("url", "https://x.com/a/")]);
        assert_eq!(dedup_key(&post).as_deref(), Some("x.com/a"));

        let keyless = item(SourceKind::Newsletter, "n", &[]);
        assert!(dedup_key(&keyless).is_none());

        let empty_id = item(SourceKind::Linkedin, "l", &[("id", "")]);
        assert!(dedup_key(&empty_id).is_none());
    }

    #[tokio::test]
    async fn test_trailing_slash_and_protocol_duplicates_collapse() {
        let results = results_with([
            vec![
                item(SourceKind::Newsletter, "a", &[("url", "https://x.com/a")]),
                item(SourceKind::Newsletter, "a again", &[("url", "https://x.com/a/")]),
                item(SourceKind::Newsletter, "a thrice", &[("url", "http://X.com/a")]),
            ],
            vec![],
            vec![],
            vec![],
        ]);

        let exporter = MockExporter::new();
        let output = consolidate("Jane Doe", &results, &exporter).await.unwrap();

        assert_eq!(output.total_pieces, 1);
        assert_eq!(output.all_content[0].content, "a");
    }

    #[tokio::test]
    async fn test_keyless_items_are_always_kept() {
        let results = results_with([
            vec![
                item(SourceKind::Newsletter, "one", &[]),
                item(SourceKind::Newsletter, "two", &[]),
            ],
            vec![],
            vec![],
            vec![],
        ]);

        let exporter = MockExporter::new();
        let output = consolidate("Jane Doe", &results, &exporter).await.unwrap();
        assert_eq!(output.total_pieces, 2);
    }

    #[tokio::test]
    async fn test_merge_order_is_source_order() {
        let results = results_with([
            vec![item(SourceKind::Newsletter, "n1", &[]), item(SourceKind::Newsletter, "n2", &[])],
            vec![item(SourceKind::Twitter, "t1", &[("id", "1")])],
            vec![item(SourceKind::Linkedin, "l1", &[("id", "1")])],
            vec![item(SourceKind::Blog, "b1", &[])],
        ]);

        let exporter = MockExporter::new();
        let output = consolidate("Jane Doe", &results, &exporter).await.unwrap();

        let contents: Vec<_> = output.all_content.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, vec!["n1", "n2", "t1", "l1", "b1"]);
    }

    #[tokio::test]
    async fn test_consolidation_is_idempotent() {
        let results = results_with([
            vec![
                item(SourceKind::Newsletter, "a", &[("url", "https://x.com/a")]),
                item(SourceKind::Newsletter, "dup", &[("url", "https://x.com/a/")]),
            ],
            vec![
                item(SourceKind::Twitter, "t", &[("id", "9")]),
                item(SourceKind::Twitter, "t dup", &[("id", "9")]),
            ],
            vec![],
            vec![],
        ]);

        let exporter = MockExporter::new();
        let first = consolidate("Jane Doe", &results, &exporter).await.unwrap();
        let second = consolidate("Jane Doe", &results, &exporter).await.unwrap();

        assert_eq!(first.total_pieces, second.total_pieces);
        let keys = |o: &ConsolidatedOutput| -> Vec<Option<String>> {
            o.all_content.iter().map(dedup_key).collect()
        };
        assert_eq!(keys(&first), keys(&second));
    }

    #[tokio::test]
    async fn test_failed_sources_are_annotated_not_fatal() {
        let mut results = results_with([
            vec![item(SourceKind::Newsletter, "n", &[])],
            vec![],
            vec![item(SourceKind::Linkedin, "l", &[("id", "1")])],
            vec![item(SourceKind::Blog, "b", &[])],
        ]);
        results[1] = CollectorResult::failed(SourceKind::Twitter, "NetworkTimeout");

        let exporter = MockExporter::new();
        let output = consolidate("Jane Doe", &results, &exporter).await.unwrap();

        assert_eq!(output.total_pieces, 3);
        let twitter = &output.source_reports[1];
        assert!(twitter.failed);
        assert_eq!(twitter.error.as_deref(), Some("NetworkTimeout"));
        assert_eq!(twitter.collected, 0);
    }

    #[tokio::test]
    async fn test_export_failure_substitutes_placeholder() {
        let results = results_with([vec![], vec![], vec![], vec![]]);

        let exporter = MockExporter::new().failing();
        let output = consolidate("Jane Doe", &results, &exporter).await.unwrap();

        assert!(output.artifact.placeholder);
        assert!(output.artifact.location.is_none());
        assert_eq!(output.total_pieces, 0);
    }

    #[tokio::test]
    async fn test_all_skipped_run_yields_placeholder_without_export() {
        let results: Vec<CollectorResult> = SourceKind::ALL
            .into_iter()
            .map(CollectorResult::skipped)
            .collect();

        let exporter = MockExporter::new();
        let output = consolidate("Jane Doe", &results, &exporter).await.unwrap();

        assert_eq!(output.total_pieces, 0);
        assert!(output.artifact.placeholder);
        assert!(output.artifact.location.is_none());
        assert!(exporter.recorded_exports().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_fan_in_is_rejected() {
        let exporter = MockExporter::new();
        let short = vec![CollectorResult::skipped(SourceKind::Blog)];
        let err = consolidate("Jane Doe", &short, &exporter).await.unwrap_err();
        assert!(matches!(err, PipelineError::Consolidation(_)));
    }
}
