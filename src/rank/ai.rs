// src/rank/ai.rs
// Semantic ranker backed by the OpenAI Chat Completions API. One bounded call
// per run; any failure shape surfaces as Err so the strategy can fall back.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::ingest::types::Article;
use crate::rank::{RankedArticle, Ranker, Selection};

/// Cap on candidates sent to the model; keeps the request within one context
/// window even on a backlog run.
const MAX_CANDIDATES: usize = 500;

/// Per-candidate cap on the text sent to the model. Sources do not all
/// pre-truncate (a changelog section can run to thousands of chars), so the
/// bound is enforced here, at the request boundary.
const MAX_BODY_CHARS: usize = 300;

const SYSTEM_PROMPT: &str = "You are a principal cloud architect curating a daily tech brief \
for a corporate platform engineer (Azure, Terraform, GitHub Actions, Python, AI engineering). \
Review the provided items and select the most relevant, highest-signal ones. \
Ignore consumer tech news, marketing fluff, and beginner tutorials. \
Return a raw JSON list, no Markdown fences. \
Object schema: {\"key\": \"<item key>\", \"reason\": \"one sentence why it matters\"}. \
Order the list from most to least relevant.";

pub struct SemanticRanker {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct CandidateItem<'a> {
    key: &'a str,
    source: &'a str,
    text: String,
}

/// Bound one candidate's text for the request body.
pub fn bound_candidate_text(s: &str) -> String {
    crate::ingest::truncate_chars(s, MAX_BODY_CHARS)
}

/// One entry of the model's response.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Pick {
    pub key: String,
    #[serde(default)]
    pub reason: String,
}

impl SemanticRanker {
    /// Reads `OPENAI_API_KEY` (and optional `OPENAI_MODEL`). Returns `None`
    /// when no key is configured so the strategy runs keyword-only.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Some(Self::new(api_key, model))
    }

    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("daily-brief/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            model,
        }
    }

    async fn call_model(&self, candidates: &[Article], max_results: usize) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let items: Vec<CandidateItem> = candidates
            .iter()
            .take(MAX_CANDIDATES)
            .map(|a| CandidateItem {
                key: &a.identity_key,
                source: &a.source,
                text: bound_candidate_text(&a.full_text),
            })
            .collect();
        let user = format!(
            "Select up to {max_results} items.\nInput data:\n{}",
            serde_json::to_string(&items).context("serializing candidates")?
        );

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.2,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("semantic ranking http call")?;
        if !resp.status().is_success() {
            return Err(anyhow!("semantic ranking http status {}", resp.status()));
        }
        let body: Resp = resp.json().await.context("semantic ranking body")?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("semantic ranking returned no choices"))
    }
}

/// Parse the model output into picks, tolerating Markdown code fences the
/// model sometimes wraps around JSON despite instructions.
pub fn parse_picks(text: &str) -> Result<Vec<Pick>> {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```") {
        // drop the fence line ("```json" or bare "```") and the closing fence
        cleaned = rest.split_once('\n').map(|(_, tail)| tail).unwrap_or(rest);
        cleaned = cleaned.trim_end().trim_end_matches("```").trim_end();
    }
    serde_json::from_str(cleaned).context("parsing semantic ranking json")
}

/// Map validated picks back onto input candidates. Picks whose key does not
/// match any input are dropped — the model must never invent candidates.
/// Scores derive from response position, first highest.
pub fn apply_picks(picks: Vec<Pick>, candidates: &[Article], max_results: usize) -> Selection {
    let by_key: HashMap<&str, &Article> = candidates
        .iter()
        .map(|a| (a.identity_key.as_str(), a))
        .collect();

    let mut taken: Vec<(Pick, &Article)> = Vec::new();
    for pick in picks {
        if taken.len() >= max_results {
            break;
        }
        let Some(&art) = by_key.get(pick.key.as_str()) else {
            tracing::warn!(key = %pick.key, "model returned unknown key, dropping");
            continue;
        };
        if taken.iter().any(|(p, _)| p.key == pick.key) {
            continue; // model repeated itself
        }
        taken.push((pick, art));
    }

    let n = taken.len();
    taken
        .into_iter()
        .enumerate()
        .map(|(i, (pick, art))| RankedArticle {
            article: art.clone(),
            reason: if pick.reason.trim().is_empty() {
                "Selected by semantic ranking.".to_string()
            } else {
                pick.reason.trim().to_string()
            },
            score: (n - i) as f64,
        })
        .collect()
}

#[async_trait]
impl Ranker for SemanticRanker {
    async fn rank(&self, candidates: &[Article], max_results: usize) -> Result<Selection> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let content = self.call_model(candidates, max_results).await?;
        let picks = parse_picks(&content)?;
        if picks.is_empty() {
            return Err(anyhow!("semantic ranking returned an empty selection"));
        }
        Ok(apply_picks(picks, candidates, max_results))
    }

    fn name(&self) -> &'static str {
        "semantic"
    }
}
