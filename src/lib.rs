// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod dedup;
pub mod error;
pub mod history;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod rank;
pub mod select;

// ---- Re-exports for stable public API ----
pub use crate::config::BriefConfig;
pub use crate::error::BriefError;
pub use crate::ingest::types::{Article, SourceProvider};
pub use crate::pipeline::{BriefPipeline, RunReport};
pub use crate::rank::{RankStrategy, RankedArticle, Selection};
