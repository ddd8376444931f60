//! Shared types, error model, configuration and task loading for SiteDoc.
//!
//! This crate is the foundation depended on by all other SiteDoc crates.
//! It provides:
//! - [`SiteDocError`]: the unified error type
//! - Domain types ([`CrawlTask`], [`PageRecord`], [`NodeIndex`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)
//! - The task file loader ([`load_tasks`], [`resolve_tasks`])

pub mod config;
pub mod error;
pub mod tasks;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlSection, DEFAULT_USER_AGENT, OutputFormat, OutputSection,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, SiteDocError};
pub use tasks::{
    DEFAULT_TASKS_FILE, TaskDescriptor, TaskEntry, example_tasks, load_tasks, parse_tasks,
    resolve_tasks, write_example_tasks,
};
pub use types::{CrawlTask, DEFAULT_LINK_TEXT, Heading, Link, NO_TITLE, NodeIndex, PageRecord};
