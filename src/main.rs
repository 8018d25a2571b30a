//! Daily Brief — one-shot binary entrypoint.
//! Loads configuration, runs the ingest→dedup→rank→deliver pipeline once,
//! and exits. Intended to be invoked by an external scheduler (cron, CI).
//!
//! Exit codes: 0 for a run that completed (even with an empty digest),
//! 2 for configuration problems, 1 for a failed run (history store fatal,
//! ranking totally unavailable, delivery failed). A failed run mutates
//! nothing and is safe to re-run.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use daily_brief::config::BriefConfig;
use daily_brief::history::HistoryStore;
use daily_brief::notify::email::BriefMailer;
use daily_brief::pipeline::{build_providers, BriefPipeline};
use daily_brief::rank::RankStrategy;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("daily_brief=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op where the environment is already set.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match BriefConfig::load_default() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = ?e, "failed to load config");
            return ExitCode::from(2);
        }
    };
    if config.sources.is_empty() {
        tracing::error!("no sources configured, nothing to do");
        return ExitCode::from(2);
    }

    let mailer = match BriefMailer::from_env() {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = ?e, "email delivery not configured");
            return ExitCode::from(2);
        }
    };

    let store = HistoryStore::new(config.history_path.clone(), config.ignore_history_errors);
    let strategy = RankStrategy::from_config(&config);
    let providers = build_providers(&config);
    let pipeline = BriefPipeline::new(config, store, strategy, Arc::new(mailer), providers);

    match pipeline.run().await {
        Ok(report) => {
            tracing::info!(
                fetched = report.fetched,
                fresh = report.fresh,
                selected = report.selected,
                delivered = report.delivered,
                committed = report.committed,
                "run finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = ?e, "run failed, nothing committed");
            ExitCode::FAILURE
        }
    }
}
