// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::error::BriefError;
use crate::ingest::types::{Article, SourceProvider};
use crate::ingest::{clean_html, truncate_chars};

const USER_AGENT: &str = "daily-brief/0.1 (+rss fetcher)";
const SUMMARY_CHARS: usize = 250;
const BODY_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_utc(ts: &str) -> Option<DateTime<Utc>> {
    let unix = OffsetDateTime::parse(ts, &Rfc2822)
        .ok()?
        .to_offset(UtcOffset::UTC)
        .unix_timestamp();
    DateTime::from_timestamp(unix, 0)
}

/// Fetches and parses one RSS 2.0 feed into candidate articles.
pub struct RssProvider {
    source: String,
    url: String,
    priority: f32,
    client: reqwest::Client,
}

impl RssProvider {
    pub fn new(source: &str, url: &str, priority: f32) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
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

/// Pure parse step, kept separate from the fetch so tests can feed fixtures.
pub fn parse_feed(source: &str, priority: f32, body: &str) -> Result<Vec<Article>> {
    let xml_clean = scrub_html_entities_for_xml(body);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let title = it.title.as_deref().unwrap_or_default().trim().to_string();
        let link = match it.link.as_deref() {
            Some(l) if !l.trim().is_empty() => l.trim().to_string(),
            _ => continue, // no canonical locator, no identity key
        };
        let body_text = clean_html(it.description.as_deref().unwrap_or_default());
        let full_text = format!("{} - {}", title, truncate_chars(&body_text, BODY_CHARS));

        let mut art = Article::new(
            source.trim(),
            &title,
            &link,
            &truncate_chars(&body_text, SUMMARY_CHARS),
            &full_text,
        );
        art.published_at = it.pub_date.as_deref().and_then(parse_rfc2822_utc);
        art.priority_hint = Some(priority);
        out.push(art);
    }
    Ok(out)
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| BriefError::SourceUnavailable {
                source_name: self.source.clone(),
                message: e.to_string(),
            })?;
        let body = resp.text().await.context("rss http .text()")?;
        parse_feed(&self.source, self.priority, &body)
    }

    fn name(&self) -> &str {
        &self.source
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
