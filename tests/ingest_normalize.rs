// tests/ingest_normalize.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use daily_brief::ingest::types::{Article, SourceProvider};
use daily_brief::ingest::{fetch_all, normalize};

struct FixedProvider {
    name: String,
    keys: Vec<&'static str>,
}

#[async_trait]
impl SourceProvider for FixedProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        Ok(self
            .keys
            .iter()
            .map(|k| {
                let mut a = Article::new(
                    &self.name,
                    &format!("Title {k}"),
                    &format!("https://example.test/{k}"),
                    "summary",
                    "text",
                );
                a.identity_key = k.to_string();
                a
            })
            .collect())
    }
    fn name(&self) -> &str {
        &self.name
    }
}

struct BrokenProvider;

#[async_trait]
impl SourceProvider for BrokenProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        Err(anyhow!("connection refused"))
    }
    fn name(&self) -> &str {
        "Broken"
    }
}

#[tokio::test]
async fn overlapping_sources_collapse_within_run() {
    let providers: Vec<Arc<dyn SourceProvider>> = vec![
        Arc::new(FixedProvider {
            name: "One".into(),
            keys: vec!["a", "b"],
        }),
        Arc::new(FixedProvider {
            name: "Two".into(),
            keys: vec!["b", "c"],
        }),
    ];

    let batches = fetch_all(&providers).await;
    assert_eq!(batches.len(), 2);

    let (kept, dropped, dups) = normalize(batches);
    let keys: Vec<_> = kept.iter().map(|a| a.identity_key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    // first occurrence of "b" wins, so it carries source "One"
    assert_eq!(kept[1].source, "One");
    assert_eq!(dropped, 0);
    assert_eq!(dups, 1);
}

#[tokio::test]
async fn failed_source_is_skipped_not_fatal() {
    let providers: Vec<Arc<dyn SourceProvider>> = vec![
        Arc::new(BrokenProvider),
        Arc::new(FixedProvider {
            name: "Ok".into(),
            keys: vec!["x"],
        }),
    ];

    let batches = fetch_all(&providers).await;
    assert_eq!(batches.len(), 2);
    assert!(batches[0].is_empty());
    assert_eq!(batches[1].len(), 1);

    let (kept, _, _) = normalize(batches);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].identity_key, "x");
}
