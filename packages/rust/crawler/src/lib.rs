//! Recursive same-site crawler and content extraction.
//!
//! This crate provides:
//! - [`extract`]: turns fetched HTML into a [`PageRecord`](sitedoc_shared::PageRecord)
//! - [`fetch`]: the HTTP client used for every page request
//! - [`visited`]: the per-task registry of visited URLs
//! - [`engine`]: the depth-first [`Crawler`] and the [`DocumentEmitter`] boundary

pub mod engine;
pub mod extract;
pub mod fetch;
pub mod visited;

pub use engine::{CrawlObserver, CrawlReport, CrawlSession, Crawler, DocumentEmitter, SilentObserver};
pub use extract::{extract, is_child_candidate};
pub use fetch::Fetcher;
pub use visited::VisitedSet;
