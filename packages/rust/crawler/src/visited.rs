//! Per-task registry of URLs already committed to.

use std::collections::HashSet;

/// URLs visited during one top-level task.
///
/// Membership is exact string identity of the resolved URL. Nothing is
/// canonicalised here: `/a` and `/a/`, or `/a` and `/a#top`, are distinct.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Register `url`. Marking an already visited URL is a no-op.
    pub fn mark_visited(&mut self, url: &str) {
        if !self.urls.contains(url) {
            self.urls.insert(url.to_owned());
        }
    }

    /// Forget every URL; called when a new top-level task begins.
    pub fn reset(&mut self) {
        self.urls.clear();
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_is_idempotent() {
        let mut visited = VisitedSet::new();
        visited.mark_visited("https://example.com/");
        visited.mark_visited("https://example.com/");
        assert_eq!(visited.len(), 1);
        assert!(visited.contains("https://example.com/"));
    }

    #[test]
    fn no_canonicalisation() {
        let mut visited = VisitedSet::new();
        visited.mark_visited("https://example.com/docs");
        assert!(!visited.contains("https://example.com/docs/"));
        assert!(!visited.contains("https://example.com/docs#intro"));
    }

    #[test]
    fn reset_clears_membership() {
        let mut visited = VisitedSet::new();
        visited.mark_visited("https://example.com/");
        visited.reset();
        assert!(visited.is_empty());
        assert!(!visited.contains("https://example.com/"));
    }
}
