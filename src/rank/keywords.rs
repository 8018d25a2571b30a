// src/rank/keywords.rs
// Deterministic fallback ranker. Total over any well-formed candidate set:
// it never errors, so the pipeline always produces a selection (possibly
// empty) instead of aborting.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::WeightedKeyword;
use crate::ingest::types::Article;
use crate::rank::{RankedArticle, Ranker, Selection};

pub struct KeywordRanker {
    keywords: Vec<WeightedKeyword>,
}

struct Scored<'a> {
    article: &'a Article,
    score: f64,
    best_keyword: Option<&'a str>,
}

impl KeywordRanker {
    pub fn new(keywords: Vec<WeightedKeyword>) -> Self {
        let keywords = keywords
            .into_iter()
            .filter(|k| !k.word.trim().is_empty())
            .map(|k| WeightedKeyword {
                word: k.word.trim().to_lowercase(),
                weight: k.weight,
            })
            .collect();
        Self { keywords }
    }

    /// Weighted occurrence count over title + body, case-insensitive.
    fn score_one<'a>(&'a self, article: &'a Article) -> Scored<'a> {
        let haystack = format!("{} {}", article.title, article.full_text).to_lowercase();

        let mut score = 0.0f64;
        let mut best: Option<(&str, f64)> = None;
        for kw in &self.keywords {
            let hits = count_occurrences(&haystack, &kw.word);
            if hits == 0 {
                continue;
            }
            let contribution = hits as f64 * kw.weight as f64;
            score += contribution;
            if best.map(|(_, c)| contribution > c).unwrap_or(true) {
                best = Some((kw.word.as_str(), contribution));
            }
        }

        Scored {
            article,
            score,
            best_keyword: best.map(|(w, _)| w),
        }
    }
}

// Plain substring counting: configured stems ("deprecat") are meant to match
// their derived forms, so there is no word-boundary check.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

#[async_trait]
impl Ranker for KeywordRanker {
    async fn rank(&self, candidates: &[Article], max_results: usize) -> Result<Selection> {
        let mut scored: Vec<Scored> = candidates
            .iter()
            .map(|a| self.score_one(a))
            .filter(|s| s.score > 0.0)
            .collect();

        // Stable sort keeps candidate order for full ties; source priority
        // breaks score ties before that.
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| {
                    let pa = a.article.priority_hint.unwrap_or(0.0);
                    let pb = b.article.priority_hint.unwrap_or(0.0);
                    pb.total_cmp(&pa)
                })
        });

        Ok(scored
            .into_iter()
            .take(max_results)
            .map(|s| RankedArticle {
                article: s.article.clone(),
                reason: match s.best_keyword {
                    Some(w) => format!("matched keyword: {w}"),
                    None => "matched configured keywords".to_string(),
                },
                score: s.score,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "keywords"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(word: &str, weight: f32) -> WeightedKeyword {
        WeightedKeyword {
            word: word.into(),
            weight,
        }
    }

    fn art(key: &str, title: &str, text: &str, priority: f32) -> Article {
        Article {
            identity_key: key.to_string(),
            source: "S".into(),
            title: title.to_string(),
            summary: String::new(),
            full_text: text.to_string(),
            link: format!("https://example.test/{key}"),
            published_at: None,
            priority_hint: Some(priority),
        }
    }

    #[tokio::test]
    async fn scoring_is_case_insensitive_and_weighted() {
        let ranker = KeywordRanker::new(vec![kw("Terraform", 2.0), kw("azure", 1.0)]);
        let candidates = vec![
            art("a", "Azure news", "azure azure", 0.5),
            art("b", "TERRAFORM deep dive", "terraform modules", 0.5),
        ];
        let sel = ranker.rank(&candidates, 10).await.unwrap();
        // b: 2 hits * 2.0 = 4.0; a: 3 hits * 1.0 = 3.0
        assert_eq!(sel[0].article.identity_key, "b");
        assert_eq!(sel[0].reason, "matched keyword: terraform");
        assert!(sel[0].score > sel[1].score);
    }

    #[tokio::test]
    async fn score_ties_break_by_priority_then_input_order() {
        let ranker = KeywordRanker::new(vec![kw("rust", 1.0)]);
        let candidates = vec![
            art("low", "rust", "", 0.2),
            art("high", "rust", "", 0.9),
            art("low2", "rust", "", 0.2),
        ];
        let sel = ranker.rank(&candidates, 10).await.unwrap();
        let keys: Vec<_> = sel.iter().map(|r| r.article.identity_key.as_str()).collect();
        assert_eq!(keys, vec!["high", "low", "low2"]);
    }

    #[tokio::test]
    async fn stem_keywords_match_derived_forms() {
        let ranker = KeywordRanker::new(vec![kw("deprecat", 1.0)]);
        let candidates = vec![
            art("a", "API deprecated in v2", "deprecation notice", 0.5),
            art("b", "unrelated", "", 0.5),
        ];
        let sel = ranker.rank(&candidates, 10).await.unwrap();
        assert_eq!(sel.len(), 1);
        assert_eq!(sel[0].article.identity_key, "a");
        assert!((sel[0].score - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn unmatched_candidates_are_excluded_and_empty_is_valid() {
        let ranker = KeywordRanker::new(vec![kw("terraform", 1.0)]);
        let candidates = vec![art("a", "Cooking tips", "pasta", 0.5)];
        let sel = ranker.rank(&candidates, 10).await.unwrap();
        assert!(sel.is_empty());
    }

    #[tokio::test]
    async fn deterministic_for_identical_input() {
        let ranker = KeywordRanker::new(vec![kw("ai", 1.0), kw("cloud", 1.5)]);
        let candidates = vec![
            art("a", "ai in the cloud", "cloud cloud", 0.5),
            art("b", "ai everywhere", "ai ai ai", 0.5),
            art("c", "cloud first", "", 0.7),
        ];
        let s1 = ranker.rank(&candidates, 10).await.unwrap();
        let s2 = ranker.rank(&candidates, 10).await.unwrap();
        let k1: Vec<_> = s1.iter().map(|r| r.article.identity_key.clone()).collect();
        let k2: Vec<_> = s2.iter().map(|r| r.article.identity_key.clone()).collect();
        assert_eq!(k1, k2);
    }
}
