// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{Article, SourceProvider};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::sync::Arc;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_articles_total", "Articles parsed from providers.");
        describe_counter!(
            "ingest_dropped_total",
            "Malformed articles dropped during normalization."
        );
        describe_counter!(
            "ingest_duplicate_total",
            "Within-run duplicates collapsed by identity key."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!(
            "rank_fallback_total",
            "Runs where the keyword fallback ranker was used."
        );
        describe_counter!("history_commit_total", "Identity keys committed as seen.");
    });
}

/// Strip tags, decode entities, collapse whitespace. Shared by both providers.
pub fn clean_html(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Char-safe truncation with an ellipsis marker.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}

/// Fetch all providers concurrently and wait for every one of them.
/// A failed provider is logged and counted; its slot yields an empty batch so
/// the output keeps one batch per configured source, in source order.
pub async fn fetch_all(providers: &[Arc<dyn SourceProvider>]) -> Vec<Vec<Article>> {
    ensure_metrics_described();

    let mut handles = Vec::with_capacity(providers.len());
    for p in providers {
        let p = Arc::clone(p);
        handles.push(tokio::spawn(async move {
            let name = p.name().to_string();
            (name, p.fetch_latest().await)
        }));
    }

    let mut batches = Vec::with_capacity(handles.len());
    for h in handles {
        match h.await {
            Ok((_, Ok(items))) => {
                counter!("ingest_articles_total").increment(items.len() as u64);
                batches.push(items);
            }
            Ok((name, Err(e))) => {
                tracing::warn!(error = ?e, provider = %name, "provider error, skipping source");
                counter!("ingest_provider_errors_total").increment(1);
                batches.push(Vec::new());
            }
            Err(e) => {
                tracing::warn!(error = ?e, "provider task panicked, skipping source");
                counter!("ingest_provider_errors_total").increment(1);
                batches.push(Vec::new());
            }
        }
    }
    batches
}

/// Merge per-source batches into one candidate set: concatenate preserving
/// source order, drop malformed entries, collapse within-run duplicates by
/// identity key (first occurrence wins).
/// Returns (kept, dropped_malformed, dropped_duplicates).
pub fn normalize(batches: Vec<Vec<Article>>) -> (Vec<Article>, usize, usize) {
    let mut dropped = 0usize;
    let mut dups = 0usize;
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for batch in batches {
        for art in batch {
            let malformed = art.identity_key.is_empty()
                || (art.title.trim().is_empty() && art.full_text.trim().is_empty());
            if malformed {
                dropped += 1;
                continue;
            }
            if !seen_keys.insert(art.identity_key.clone()) {
                dups += 1;
                continue;
            }
            out.push(art);
        }
    }

    counter!("ingest_dropped_total").increment(dropped as u64);
    counter!("ingest_duplicate_total").increment(dups as u64);
    (out, dropped, dups)
}
