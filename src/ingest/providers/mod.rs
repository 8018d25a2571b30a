// src/ingest/providers/mod.rs
pub mod changelog;
pub mod rss;

pub use changelog::ChangelogProvider;
pub use rss::RssProvider;
