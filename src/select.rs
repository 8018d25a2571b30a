// src/select.rs
// Final assembly before delivery: enforce the size bound, drop entries that
// cannot render (no title), and re-verify the score ordering invariant. An
// ordering violation here is an internal logic error, not bad input.

use anyhow::{bail, Result};

use crate::rank::Selection;

pub fn assemble(mut selection: Selection, max_results: usize) -> Result<Selection> {
    selection.retain(|r| !r.article.title.trim().is_empty());
    selection.truncate(max_results);

    for pair in selection.windows(2) {
        if pair[1].score > pair[0].score {
            bail!(
                "selection out of order: {} ({}) after {} ({})",
                pair[1].article.identity_key,
                pair[1].score,
                pair[0].article.identity_key,
                pair[0].score
            );
        }
    }
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Article;
    use crate::rank::RankedArticle;

    fn ranked(key: &str, title: &str, score: f64) -> RankedArticle {
        RankedArticle {
            article: Article {
                identity_key: key.to_string(),
                source: "S".into(),
                title: title.to_string(),
                summary: String::new(),
                full_text: String::new(),
                link: format!("https://example.test/{key}"),
                published_at: None,
                priority_hint: None,
            },
            reason: "r".into(),
            score,
        }
    }

    #[test]
    fn truncates_to_max_results() {
        let sel = vec![ranked("a", "A", 3.0), ranked("b", "B", 2.0), ranked("c", "C", 1.0)];
        let out = assemble(sel, 2).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].article.identity_key, "a");
    }

    #[test]
    fn strips_entries_without_titles() {
        let sel = vec![ranked("a", "  ", 3.0), ranked("b", "B", 2.0)];
        let out = assemble(sel, 10).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].article.identity_key, "b");
    }

    #[test]
    fn out_of_order_scores_are_an_internal_error() {
        let sel = vec![ranked("a", "A", 1.0), ranked("b", "B", 2.0)];
        assert!(assemble(sel, 10).is_err());
    }

    #[test]
    fn equal_scores_are_valid() {
        let sel = vec![ranked("a", "A", 2.0), ranked("b", "B", 2.0)];
        assert!(assemble(sel, 10).is_ok());
    }
}
