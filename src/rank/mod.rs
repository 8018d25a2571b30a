// src/rank/mod.rs
//! Ranking strategy: a semantic ranker backed by an external model, with a
//! deterministic keyword fallback that is total over any well-formed candidate
//! set. The fallback runs synchronously in the same run whenever the semantic
//! call fails for any reason (timeout, auth, malformed or empty response) —
//! the pipeline is fail-safe, not fail-stop.

pub mod ai;
pub mod keywords;

use anyhow::Result;
use metrics::counter;

use crate::config::BriefConfig;
use crate::error::BriefError;
use crate::ingest::types::Article;
use crate::rank::ai::SemanticRanker;
use crate::rank::keywords::KeywordRanker;

/// One digest entry: the candidate plus a one-line justification and a score.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RankedArticle {
    pub article: Article,
    pub reason: String,
    pub score: f64,
}

/// Ordered by non-increasing score; ties keep candidate order.
pub type Selection = Vec<RankedArticle>;

#[async_trait::async_trait]
pub trait Ranker: Send + Sync {
    async fn rank(&self, candidates: &[Article], max_results: usize) -> Result<Selection>;
    fn name(&self) -> &'static str;
}

/// Primary-with-fallback strategy. The primary is optional (no API key means
/// keyword-only operation); the fallback is always present.
pub struct RankStrategy {
    primary: Option<Box<dyn Ranker>>,
    fallback: KeywordRanker,
}

impl RankStrategy {
    pub fn new(primary: Option<Box<dyn Ranker>>, fallback: KeywordRanker) -> Self {
        Self { primary, fallback }
    }

    /// Build from config + environment: semantic ranker if `OPENAI_API_KEY`
    /// is present, keyword fallback from the configured weights (or the seed).
    pub fn from_config(config: &BriefConfig) -> Self {
        let primary = match SemanticRanker::from_env() {
            Some(r) => Some(Box::new(r) as Box<dyn Ranker>),
            None => {
                tracing::info!("OPENAI_API_KEY not set, semantic ranking disabled");
                None
            }
        };
        Self::new(primary, KeywordRanker::new(config.keyword_weights()))
    }

    /// Rank candidates, falling back deterministically if the primary fails.
    /// Errs with `RankingUnavailable` only if both paths fail; the keyword
    /// path is total, so that means a logic error rather than bad input.
    pub async fn rank(
        &self,
        candidates: &[Article],
        max_results: usize,
    ) -> Result<Selection, BriefError> {
        if let Some(primary) = &self.primary {
            match primary.rank(candidates, max_results).await {
                Ok(sel) if !sel.is_empty() => return Ok(sel),
                Ok(_) => {
                    tracing::warn!(ranker = primary.name(), "empty selection, falling back");
                }
                Err(e) => {
                    tracing::warn!(ranker = primary.name(), error = ?e, "ranker failed, falling back");
                }
            }
            counter!("rank_fallback_total").increment(1);
        }

        self.fallback
            .rank(candidates, max_results)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "keyword fallback failed");
                BriefError::RankingUnavailable
            })
    }
}
