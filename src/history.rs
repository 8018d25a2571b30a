// src/history.rs
// Seen-article store: an append-only JSON map from identity key to record.
// Read once per run for membership, written once after a delivered run.
// Writes go through a tmp file + rename so a crashed run never leaves a
// half-written store behind.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::BriefError;
use crate::ingest::types::Article;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenRecord {
    pub title: String,
    pub link: String,
    pub seen_at: DateTime<Utc>,
}

pub struct HistoryStore {
    path: PathBuf,
    /// When set, an unreadable store is treated as "nothing seen" instead of
    /// aborting the run. Off by default to avoid resending everything after
    /// a corrupted read.
    ignore_load_errors: bool,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, ignore_load_errors: bool) -> Self {
        Self {
            path: path.into(),
            ignore_load_errors,
        }
    }

    /// Membership snapshot for the dedup filter. A missing file is an empty
    /// history (first run); any other failure is fatal unless configured
    /// otherwise.
    pub fn load_seen_keys(&self) -> Result<HashSet<String>, BriefError> {
        match read_store(&self.path) {
            Ok(map) => Ok(map.into_keys().collect()),
            Err(e) if e.is_missing_file() => Ok(HashSet::new()),
            Err(e) => {
                if self.ignore_load_errors {
                    tracing::warn!(error = %e, "history store unreadable, treating as empty");
                    Ok(HashSet::new())
                } else {
                    Err(BriefError::StoreUnavailable(e.to_string()))
                }
            }
        }
    }

    /// Persist identity keys as seen. Called only after delivery succeeded;
    /// existing records are never mutated or deleted.
    pub fn record_seen(&self, articles: &[Article]) -> Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }
        let mut map = read_store(&self.path).unwrap_or_default();
        let now = Utc::now();
        let mut added = 0usize;
        for art in articles {
            map.entry(art.identity_key.clone()).or_insert_with(|| {
                added += 1;
                SeenRecord {
                    title: art.title.clone(),
                    link: art.link.clone(),
                    seen_at: now,
                }
            });
        }
        write_store(&self.path, &map)?;
        counter!("history_commit_total").increment(added as u64);
        tracing::info!(added, total = map.len(), "saved articles to history");
        Ok(added)
    }
}

#[derive(Debug)]
struct StoreReadError {
    missing: bool,
    message: String,
}

impl StoreReadError {
    fn is_missing_file(&self) -> bool {
        self.missing
    }
}

impl std::fmt::Display for StoreReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

fn read_store(path: &Path) -> Result<BTreeMap<String, SeenRecord>, StoreReadError> {
    let content = fs::read_to_string(path).map_err(|e| StoreReadError {
        missing: e.kind() == std::io::ErrorKind::NotFound,
        message: format!("reading {}: {e}", path.display()),
    })?;
    serde_json::from_str(&content).map_err(|e| StoreReadError {
        missing: false,
        message: format!("parsing {}: {e}", path.display()),
    })
}

fn write_store(path: &Path, map: &BTreeMap<String, SeenRecord>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(map).context("serializing history store")?;
    let tmp = path.with_extension("json.tmp");
    let mut f = fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    f.write_all(json.as_bytes()).context("writing history store")?;
    fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
    Ok(())
}
