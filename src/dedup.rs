// src/dedup.rs
// Pure set-difference against the committed history. The store lookup happens
// elsewhere; this stage does no I/O so it stays independently testable.

use std::collections::HashSet;

use crate::ingest::types::Article;

/// Returns the subsequence of `articles` whose identity key is absent from
/// `seen`, preserving relative order.
pub fn filter_seen(articles: Vec<Article>, seen: &HashSet<String>) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|a| !seen.contains(&a.identity_key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(key: &str) -> Article {
        Article {
            identity_key: key.to_string(),
            source: "S".into(),
            title: key.to_uppercase(),
            summary: String::new(),
            full_text: String::new(),
            link: format!("https://example.test/{key}"),
            published_at: None,
            priority_hint: None,
        }
    }

    #[test]
    fn exact_set_difference_order_preserving() {
        let seen: HashSet<String> = ["a".to_string()].into_iter().collect();
        let out = filter_seen(vec![art("a"), art("b"), art("c")], &seen);
        assert_eq!(
            out.iter().map(|a| a.identity_key.as_str()).collect::<Vec<_>>(),
            vec!["b", "c"]
        );
    }

    #[test]
    fn empty_seen_set_is_identity() {
        let seen = HashSet::new();
        let out = filter_seen(vec![art("a"), art("b")], &seen);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn full_overlap_yields_empty() {
        let seen: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let out = filter_seen(vec![art("a"), art("b")], &seen);
        assert!(out.is_empty());
    }
}
