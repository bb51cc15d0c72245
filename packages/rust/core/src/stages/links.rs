//! Link-normalize: make relative links absolute under the site mount.

use docmirror_shared::Document;

use super::{PathShape, Stage};
use crate::paths::{PathParts, join_absolute};

/// Rewrites relative inline links to `<mount>/<doc dir>/<target>`, collapsed.
#[derive(Debug, Clone)]
pub struct NormalizeLinks {
    mount: String,
}

impl NormalizeLinks {
    pub fn new(mount: &str) -> Self {
        Self {
            mount: mount.to_string(),
        }
    }
}

impl Stage for NormalizeLinks {
    fn name(&self) -> &str {
        "link-normalize"
    }

    // The document directory must still be the one the author linked from.
    fn accepts(&self) -> &[PathShape] {
        &[PathShape::Rooted]
    }

    fn produces(&self) -> Option<PathShape> {
        None
    }

    fn apply(&self, mut doc: Document) -> Document {
        let dir = PathParts::parse(&doc.meta.path).dir;
        doc.body = docmirror_markdown::rewrite_relative_links(&doc.body, |url| {
            join_absolute(&[&self.mount, dir, url])
        });
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmirror_shared::TreeEntry;

    fn normalize(path: &str, body: &str) -> String {
        NormalizeLinks::new("/docs")
            .apply(Document::new(TreeEntry::blob(path, ""), body))
            .body
    }

    #[test]
    fn parent_link_collapses() {
        assert_eq!(normalize("a/b.md", "[x](../x.md)"), "[x](/docs/x.md)");
    }

    #[test]
    fn sibling_link_gets_directory() {
        assert_eq!(normalize("a/b.md", "[x](./x.md)"), "[x](/docs/a/x.md)");
        assert_eq!(normalize("a/b.md", "[x](x.md)"), "[x](/docs/a/x.md)");
    }

    #[test]
    fn root_document_links() {
        assert_eq!(normalize("guide.md", "[text](./other.md)"), "[text](/docs/other.md)");
    }

    #[test]
    fn web_links_untouched() {
        let body = "[a](https://netdata.cloud) [b](HTTP://example.com/x)";
        assert_eq!(normalize("a/b.md", body), body);
    }

    #[test]
    fn already_absolute_links_stay_under_mount() {
        assert_eq!(normalize("a/b.md", "[x](/y.md)"), "[x](/docs/a/y.md)");
    }

    #[test]
    fn anchors_and_other_schemes_are_joined() {
        assert_eq!(normalize("a/b.md", "[s](#setup)"), "[s](/docs/a/#setup)");
        assert_eq!(
            normalize("a/b.md", "[m](mailto:team@example.com)"),
            "[m](/docs/a/mailto:team@example.com)"
        );
    }

    #[test]
    fn path_untouched() {
        let doc = NormalizeLinks::new("/site")
            .apply(Document::new(TreeEntry::blob("a/README.md", ""), "[x](y.md)"));
        assert_eq!(doc.meta.path, "a/README.md");
        assert_eq!(doc.body, "[x](/site/a/y.md)");
    }
}
