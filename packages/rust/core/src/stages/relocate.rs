//! Relocate-to-root: lift the docs directory to the output root.

use docmirror_shared::Document;

use super::{PathShape, Stage};
use crate::paths::strip_dir_prefix;

/// Strips the docs prefix (`docs/` by default) from document paths.
#[derive(Debug, Clone)]
pub struct RelocateToRoot {
    prefix: String,
}

impl RelocateToRoot {
    /// `prefix` is treated as a directory; a missing trailing `/` is added.
    pub fn new(prefix: &str) -> Self {
        let prefix = if prefix.is_empty() || prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };
        Self { prefix }
    }
}

impl Stage for RelocateToRoot {
    fn name(&self) -> &str {
        "relocate-to-root"
    }

    fn accepts(&self) -> &[PathShape] {
        &[PathShape::Source]
    }

    fn produces(&self) -> Option<PathShape> {
        Some(PathShape::Rooted)
    }

    fn apply(&self, mut doc: Document) -> Document {
        let relocated = strip_dir_prefix(&doc.meta.path, &self.prefix);
        if relocated.len() != doc.meta.path.len() {
            doc.meta.path = relocated.to_string();
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmirror_shared::TreeEntry;

    fn relocate(stage: &RelocateToRoot, path: &str) -> String {
        stage
            .apply(Document::new(TreeEntry::blob(path, ""), "body"))
            .meta
            .path
    }

    #[test]
    fn strips_docs_prefix() {
        let stage = RelocateToRoot::new("docs/");
        assert_eq!(relocate(&stage, "docs/guide.md"), "guide.md");
        assert_eq!(relocate(&stage, "docs/a/b.md"), "a/b.md");
    }

    #[test]
    fn other_paths_unchanged() {
        let stage = RelocateToRoot::new("docs/");
        assert_eq!(relocate(&stage, "collectors/x.md"), "collectors/x.md");
        assert_eq!(relocate(&stage, "docsite/x.md"), "docsite/x.md");
        assert_eq!(relocate(&stage, "web/docs/x.md"), "web/docs/x.md");
    }

    #[test]
    fn idempotent_once_stripped() {
        let stage = RelocateToRoot::new("docs/");
        for path in ["docs/guide.md", "collectors/x.md", "a.md"] {
            let once = relocate(&stage, path);
            assert_eq!(relocate(&stage, &once), once);
        }
    }

    #[test]
    fn prefix_gets_trailing_slash() {
        let stage = RelocateToRoot::new("documentation");
        assert_eq!(relocate(&stage, "documentation/a.md"), "a.md");
        assert_eq!(relocate(&stage, "documentation.md"), "documentation.md");
    }

    #[test]
    fn body_untouched() {
        let stage = RelocateToRoot::new("docs/");
        let doc = stage.apply(Document::new(TreeEntry::blob("docs/a.md", ""), "# A"));
        assert_eq!(doc.body, "# A");
    }
}
