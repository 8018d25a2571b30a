// src/ingest/providers/changelog.rs
// Changelog documents are loosely structured Markdown: one `## ` heading per
// release, body lines underneath. Each section becomes one candidate whose
// link is the source URL plus a GitHub-style anchor, so the identity key is
// stable per (document, section).

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::error::BriefError;
use crate::ingest::types::{Article, SourceProvider};
use crate::ingest::truncate_chars;

const SUMMARY_CHARS: usize = 250;
/// Only the newest sections are candidates; historical versions would flood
/// every first run against an empty store.
const MAX_SECTIONS: usize = 5;

pub struct ChangelogProvider {
    source: String,
    url: String,
    priority: f32,
    client: reqwest::Client,
}

impl ChangelogProvider {
    pub fn new(source: &str, url: &str, priority: f32) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("daily-brief/0.1 (+changelog fetcher)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            source: source.to_string(),
            url: url.to_string(),
            priority,
            client,
        }
    }
}

/// GitHub blob URLs serve an HTML page; rewrite to the raw content host.
pub fn to_raw_url(url: &str) -> String {
    if url.contains("github.com") && url.contains("/blob/") {
        url.replace("github.com", "raw.githubusercontent.com")
            .replace("/blob/", "/")
    } else {
        url.to_string()
    }
}

/// GitHub-style heading anchor: lowercase, strip punctuation, spaces to dashes.
fn heading_anchor(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | ' ' | '-'))
        .collect::<String>()
        .replace(' ', "-")
}

/// Split a changelog into per-section candidates. Pure, fixture-testable.
pub fn parse_changelog(source: &str, url: &str, priority: f32, content: &str) -> Vec<Article> {
    let mut sections: Vec<(String, Vec<&str>)> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(heading) = trimmed.strip_prefix("## ") {
            sections.push((heading.trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = sections.last_mut() {
            body.push(line);
        }
    }

    let mut out = Vec::new();
    for (heading, body_lines) in sections.into_iter().take(MAX_SECTIONS) {
        let body = body_lines.join("\n").trim().to_string();
        let link = format!("{}#{}", url, heading_anchor(&heading));
        let mut art = Article::new(
            source,
            &format!("Changelog {heading}"),
            &link,
            &truncate_chars(&body, SUMMARY_CHARS),
            &format!("{heading}\n\n{body}"),
        );
        art.priority_hint = Some(priority);
        out.push(art);
    }
    out
}

#[async_trait]
impl SourceProvider for ChangelogProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let raw_url = to_raw_url(&self.url);
        let resp = self
            .client
            .get(&raw_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| BriefError::SourceUnavailable {
                source_name: self.source.clone(),
                message: e.to_string(),
            })?;
        let content = resp.text().await.context("changelog http .text()")?;
        Ok(parse_changelog(
            &self.source,
            &self.url,
            self.priority,
            &content,
        ))
    }

    fn name(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_matches_github_style() {
        assert_eq!(heading_anchor("2.1.22 (Hot Fix!)"), "2122-hot-fix");
        assert_eq!(heading_anchor("v1.0 - beta"), "v10---beta");
    }
}
