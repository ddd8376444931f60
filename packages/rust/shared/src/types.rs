//! Core domain types shared by the crawler, renderers and CLI.

use serde::{Deserialize, Serialize};

/// Title recorded when a page has no usable `<title>` element.
pub const NO_TITLE: &str = "No title";

/// Text recorded for an anchor without visible text.
pub const DEFAULT_LINK_TEXT: &str = "Link";

// ---------------------------------------------------------------------------
// CrawlTask
// ---------------------------------------------------------------------------

/// One top-level crawl: a seed URL and the number of node levels to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// 1-based position of the descriptor in the task file.
    pub index: usize,
    /// URL the traversal starts from.
    pub seed_url: String,
    /// Maximum node depth; always at least 1.
    pub max_depth: u32,
}

impl CrawlTask {
    /// Node index of this task's seed page.
    pub fn root_index(&self) -> NodeIndex {
        NodeIndex::root(self.index)
    }
}

// ---------------------------------------------------------------------------
// NodeIndex
// ---------------------------------------------------------------------------

/// Position of a node in a task's traversal tree, e.g. `2-1-3`.
///
/// Only used to name output documents. It is deliberately opaque: there is
/// no way to read the path back as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(String);

impl NodeIndex {
    /// Index of the seed node of the task at 1-based `task_position`.
    pub fn root(task_position: usize) -> Self {
        Self(task_position.to_string())
    }

    /// Index of the child at 1-based `position` among this node's children.
    pub fn child(&self, position: usize) -> Self {
        Self(format!("{}-{position}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// A heading found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1 through 6, as found in the markup.
    pub level: u8,
    pub text: String,
}

/// An outbound link found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Visible anchor text, or [`DEFAULT_LINK_TEXT`].
    pub text: String,
    /// Absolute URL resolved against the page URL.
    pub url: String,
}

/// Structured content extracted from one fetched page.
///
/// A record with `error` set is terminal: every content field is empty, no
/// children are followed, but a document is still emitted for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
    pub links: Vec<Link>,
    /// Same-authority links not yet visited when the page was extracted.
    pub child_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageRecord {
    /// Build the terminal record for a page that could not be fetched or parsed.
    pub fn failed(url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: Some(cause.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
