//! Readme-promote: `foo/bar/README.md` becomes `foo/bar.md`.

use tracing::trace;

use docmirror_shared::Document;

use super::{PathShape, Stage};
use crate::paths::PathParts;

/// Renames directory READMEs to the directory's sibling index file.
///
/// Links elsewhere that point at the old README path are left as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromoteReadmes;

impl PromoteReadmes {
    fn promoted(path: &str) -> Option<String> {
        let parts = PathParts::parse(path);
        (parts.base.eq_ignore_ascii_case("readme.md") && !parts.dir.is_empty())
            .then(|| format!("{}{}", parts.dir, parts.ext))
    }
}

impl Stage for PromoteReadmes {
    fn name(&self) -> &str {
        "readme-promote"
    }

    fn accepts(&self) -> &[PathShape] {
        &[PathShape::Rooted]
    }

    fn produces(&self) -> Option<PathShape> {
        Some(PathShape::Promoted)
    }

    fn apply(&self, mut doc: Document) -> Document {
        if let Some(path) = Self::promoted(&doc.meta.path) {
            trace!(from = %doc.meta.path, to = %path, "promoted readme");
            doc.meta.path = path;
        }
        doc
    }
}
