// src/error.rs
// Pipeline failure taxonomy. Per-source errors are absorbed and counted by the
// ingest layer; the remaining variants abort the run before any commit.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BriefError {
    /// A single source could not be fetched or parsed. Non-fatal: the run
    /// proceeds with the other sources.
    #[error("source unavailable: {source_name}: {message}")]
    SourceUnavailable { source_name: String, message: String },

    /// Both the semantic ranker and the keyword fallback failed. Fatal: no
    /// digest is sent.
    #[error("ranking unavailable: both semantic and keyword strategies failed")]
    RankingUnavailable,

    /// The history store could not be read. Fatal unless the run is configured
    /// to treat an unreadable store as "nothing seen".
    #[error("history store unavailable: {0}")]
    StoreUnavailable(String),

    /// Delivery of the digest failed. Fatal to commit: nothing is marked seen,
    /// so the run is safe to repeat.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}
