//! Node filter: picks the markdown documents out of a combined tree listing.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use docmirror_shared::{FilterConfig, TreeEntry};

/// A non-hidden path ending in a lowercase `.md` suffix.
static MARKDOWN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^.].*?\.md$").expect("valid regex"));

/// Decides which tree entries are eligible documents.
#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    excluded_paths: Vec<String>,
}

impl NodeFilter {
    pub fn new(excluded_paths: Vec<String>) -> Self {
        Self { excluded_paths }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.excluded_paths.clone())
    }

    /// True when `entry` is a markdown blob outside every excluded path.
    pub fn accepts(&self, entry: &TreeEntry) -> bool {
        entry.is_blob()
            && !entry.path.starts_with('.')
            && !self.is_excluded(&entry.path)
            && MARKDOWN_RE.is_match(&entry.path)
    }

    /// Keep the eligible entries, in their original order.
    pub fn apply(&self, entries: Vec<TreeEntry>) -> Vec<TreeEntry> {
        let listed = entries.len();
        let kept: Vec<TreeEntry> = entries.into_iter().filter(|e| self.accepts(e)).collect();
        debug!(listed, kept = kept.len(), "filtered tree entries");
        kept
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|excluded| path.starts_with(excluded.as_str()))
    }
}
