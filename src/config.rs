// src/config.rs
// Run configuration: the source registry, ranking limits, and keyword weights.
// Loaded once at process start and never mutated during a run.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "BRIEF_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct BriefConfig {
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    /// Upper bound on the digest size.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Weighted keywords for the fallback ranker. Empty means "use the seed".
    #[serde(default)]
    pub keywords: Vec<WeightedKeyword>,
    /// Treat an unreadable history store as "nothing seen" instead of aborting.
    #[serde(default)]
    pub ignore_history_errors: bool,
    #[serde(default = "default_history_path")]
    pub history_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub kind: SourceKind,
    /// Feed URL or changelog document URL (GitHub blob URLs are accepted).
    pub location: String,
    #[serde(default = "default_priority")]
    pub priority: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Feed,
    Changelog,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightedKeyword {
    pub word: String,
    #[serde(default = "default_keyword_weight")]
    pub weight: f32,
}

fn default_max_results() -> usize {
    15
}
fn default_priority() -> f32 {
    0.5
}
fn default_keyword_weight() -> f32 {
    1.0
}
fn default_history_path() -> String {
    "state/seen_articles.json".to_string()
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            max_results: default_max_results(),
            keywords: Vec::new(),
            ignore_history_errors: false,
            history_path: default_history_path(),
        }
    }
}

impl BriefConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
    }

    /// Load using env var + fallbacks:
    /// 1) $BRIEF_CONFIG_PATH
    /// 2) config/brief.toml
    /// 3) config/brief.json
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("BRIEF_CONFIG_PATH points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/brief.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/brief.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    /// Keyword weights for the fallback ranker, seeded when the config has none.
    pub fn keyword_weights(&self) -> Vec<WeightedKeyword> {
        if self.keywords.is_empty() {
            default_keyword_seed()
        } else {
            self.keywords.clone()
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<BriefConfig> {
    let try_toml_first = hint_ext == "toml" || s.contains("[[sources]]");

    match (
        toml::from_str::<BriefConfig>(s),
        serde_json::from_str::<BriefConfig>(s),
    ) {
        (Ok(v), Err(_)) => Ok(v),
        (Err(_), Ok(v)) => Ok(v),
        (Ok(t), Ok(j)) => Ok(if try_toml_first { t } else { j }),
        // Keep both underlying errors: a malformed config must be debuggable.
        (Err(te), Err(je)) => Err(anyhow!(
            "config parses as neither TOML ({te}) nor JSON ({je})"
        )),
    }
}

/// Built-in seed with keywords a cloud/platform engineer cares about.
/// Used as fallback if no keyword list is configured.
///
/// Matching is plain substring, not word-boundary: stems like "deprecat" are
/// deliberate and hit "deprecated"/"deprecation". Keep short keywords
/// specific enough not to match inside unrelated words.
pub(crate) fn default_keyword_seed() -> Vec<WeightedKeyword> {
    [
        ("security", 1.5),
        ("terraform", 1.4),
        ("kubernetes", 1.2),
        ("azure", 1.4),
        ("github actions", 1.3),
        ("oidc", 1.2),
        ("identity", 1.1),
        ("networking", 1.0),
        ("llm", 1.3),
        ("python", 1.0),
        ("release", 0.8),
        ("deprecat", 1.2),
        ("breaking change", 1.5),
    ]
    .into_iter()
    .map(|(word, weight)| WeightedKeyword {
        word: word.to_string(),
        weight,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn toml_and_json_formats_parse() {
        let toml_src = r#"
            max_results = 10

            [[sources]]
            name = "Azure Blog"
            kind = "feed"
            location = "https://azure.example/rss"
            priority = 0.9

            [[sources]]
            name = "claude-code"
            kind = "changelog"
            location = "https://github.com/org/repo/blob/main/CHANGELOG.md"
        "#;
        let cfg = parse_config(toml_src, "toml").unwrap();
        assert_eq!(cfg.max_results, 10);
        assert_eq!(cfg.sources.len(), 2);
        assert_eq!(cfg.sources[0].kind, SourceKind::Feed);
        assert_eq!(cfg.sources[1].kind, SourceKind::Changelog);
        assert!((cfg.sources[1].priority - 0.5).abs() < f32::EPSILON);

        let json_src = r#"{
            "sources": [
                {"name": "X", "kind": "feed", "location": "https://x.example/rss"}
            ]
        }"#;
        let cfg2 = parse_config(json_src, "json").unwrap();
        assert_eq!(cfg2.sources.len(), 1);
        assert_eq!(cfg2.max_results, 15);
    }

    #[test]
    fn malformed_config_reports_underlying_errors() {
        let err = parse_config("[[sources]\nname = ", "toml").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("neither TOML"));
        assert!(msg.contains("TOML ("), "missing toml detail: {msg}");
        assert!(msg.contains("JSON ("), "missing json detail: {msg}");
    }

    #[test]
    fn empty_keyword_list_falls_back_to_seed() {
        let cfg = BriefConfig::default();
        assert!(!cfg.keyword_weights().is_empty());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_PATH);

        // No files in temp CWD -> defaults
        let v = BriefConfig::load_default().unwrap();
        assert!(v.sources.is_empty());

        // Env takes precedence
        let p_json = tmp.path().join("brief.json");
        fs::write(
            &p_json,
            r#"{"sources":[{"name":"X","kind":"feed","location":"https://x.example/rss"}]}"#,
        )
        .unwrap();
        env::set_var(ENV_PATH, p_json.display().to_string());
        let v2 = BriefConfig::load_default().unwrap();
        assert_eq!(v2.sources.len(), 1);
        env::remove_var(ENV_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
