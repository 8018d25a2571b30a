// src/pipeline.rs
//! The run orchestrator. Stages are strictly sequential: each depends on the
//! complete output of its predecessor (dedup needs the full candidate set,
//! ranking determinism needs a fixed input order). Only the source fetches
//! fan out, and they rejoin before normalization.
//!
//! Commit ordering is a correctness contract, not an implementation detail:
//! the history store is written only after delivery reports success. A failed
//! delivery therefore leaves the store untouched and the run safe to repeat;
//! a commit-write failure after successful delivery is logged, never rolled
//! back.

use anyhow::Result;
use std::sync::Arc;

use crate::config::{BriefConfig, SourceKind};
use crate::dedup::filter_seen;
use crate::error::BriefError;
use crate::history::HistoryStore;
use crate::ingest;
use crate::ingest::providers::{ChangelogProvider, RssProvider};
use crate::ingest::types::SourceProvider;
use crate::notify::DeliveryChannel;
use crate::rank::RankStrategy;
use crate::select::assemble;

#[derive(Debug, Default)]
pub struct RunReport {
    pub fetched: usize,
    pub fresh: usize,
    pub selected: usize,
    pub delivered: bool,
    pub committed: usize,
}

pub fn build_providers(config: &BriefConfig) -> Vec<Arc<dyn SourceProvider>> {
    config
        .sources
        .iter()
        .map(|s| match s.kind {
            SourceKind::Feed => {
                Arc::new(RssProvider::new(&s.name, &s.location, s.priority))
                    as Arc<dyn SourceProvider>
            }
            SourceKind::Changelog => {
                Arc::new(ChangelogProvider::new(&s.name, &s.location, s.priority))
                    as Arc<dyn SourceProvider>
            }
        })
        .collect()
}

pub struct BriefPipeline {
    config: BriefConfig,
    store: HistoryStore,
    strategy: RankStrategy,
    delivery: Arc<dyn DeliveryChannel>,
    providers: Vec<Arc<dyn SourceProvider>>,
}

impl BriefPipeline {
    pub fn new(
        config: BriefConfig,
        store: HistoryStore,
        strategy: RankStrategy,
        delivery: Arc<dyn DeliveryChannel>,
        providers: Vec<Arc<dyn SourceProvider>>,
    ) -> Self {
        Self {
            config,
            store,
            strategy,
            delivery,
            providers,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();

        // 1) History snapshot. Fatal unless configured ignorable.
        let seen = self.store.load_seen_keys()?;

        // 2) Fan-out fetch, fan-in barrier, then normalization.
        let batches = ingest::fetch_all(&self.providers).await;
        let (candidates, dropped, dups) = ingest::normalize(batches);
        report.fetched = candidates.len();
        tracing::info!(
            candidates = candidates.len(),
            dropped,
            duplicates = dups,
            "normalized candidate set"
        );

        // 3) History filter.
        let fresh = filter_seen(candidates, &seen);
        report.fresh = fresh.len();
        if fresh.is_empty() {
            tracing::info!("no new articles today");
            return Ok(report);
        }

        // 4) Rank with fallback, then assemble.
        let selection = self
            .strategy
            .rank(&fresh, self.config.max_results)
            .await?;
        let selection = assemble(selection, self.config.max_results)?;
        report.selected = selection.len();
        if selection.is_empty() {
            tracing::info!(fresh = fresh.len(), "nothing ranked as high-signal, no digest");
            return Ok(report);
        }

        // 5) Deliver, then commit. Never the other way around.
        self.delivery
            .deliver(&selection)
            .await
            .map_err(|e| BriefError::DeliveryFailed(e.to_string()))?;
        report.delivered = true;

        // Commit every fresh candidate, not just the selection: unselected
        // articles were considered and rejected, and should not resurface
        // tomorrow.
        match self.store.record_seen(&fresh) {
            Ok(n) => report.committed = n,
            Err(e) => {
                tracing::warn!(error = ?e, "history commit failed after delivery");
            }
        }

        Ok(report)
    }
}
