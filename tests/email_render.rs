// tests/email_render.rs
use daily_brief::ingest::types::Article;
use daily_brief::notify::email::render_html;
use daily_brief::rank::RankedArticle;

fn ranked(source: &str, title: &str, link: &str, reason: &str) -> RankedArticle {
    RankedArticle {
        article: Article::new(source, title, link, "short summary", "full text"),
        reason: reason.to_string(),
        score: 1.0,
    }
}

#[test]
fn digest_contains_sources_titles_links_and_reasons() {
    let selection = vec![
        ranked(
            "Azure Blog",
            "New VM sizes",
            "https://a.example/vm",
            "Relevant to capacity planning.",
        ),
        ranked(
            "claude-code",
            "Changelog 2.1.22",
            "https://b.example/cl#2122",
            "Tooling you use daily.",
        ),
    ];

    let html = render_html(&selection);
    assert!(html.contains("Top 2 stories"));
    assert!(html.contains("Azure Blog"));
    assert!(html.contains("New VM sizes"));
    assert!(html.contains("https://a.example/vm"));
    assert!(html.contains("Why it matters:"));
    assert!(html.contains("Relevant to capacity planning."));
    assert!(html.contains("Changelog 2.1.22"));
}

#[test]
fn article_text_is_html_escaped() {
    let selection = vec![ranked(
        "Feed",
        "Generics: Vec<T> & friends",
        "https://a.example/generics",
        "reason",
    )];
    let html = render_html(&selection);
    assert!(html.contains("Vec&lt;T&gt; &amp; friends"));
    assert!(!html.contains("Vec<T> & friends"));
}
