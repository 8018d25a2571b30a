// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// One normalized candidate article, regardless of which source format it
/// came from. `identity_key` is the stable dedup key derived from the
/// canonical link; it is unique within a run after normalization.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Article {
    pub identity_key: String,
    pub source: String, // e.g., "Azure Blog", "claude-code"
    pub title: String,
    pub summary: String,   // short HTML-stripped excerpt for the digest body
    pub full_text: String, // what the ranker sees
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub priority_hint: Option<f32>, // per-source weight from config
}

impl Article {
    pub fn new(source: &str, title: &str, link: &str, summary: &str, full_text: &str) -> Self {
        Self {
            identity_key: identity_key(link),
            source: source.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            full_text: full_text.to_string(),
            link: link.to_string(),
            published_at: None,
            priority_hint: None,
        }
    }
}

/// Deterministic identity key for a canonical locator.
pub fn identity_key(link: &str) -> String {
    format!("{:x}", Sha256::digest(link.as_bytes()))
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &str;
}
