//! Sanitize stage: body cleanup via `docmirror_markdown::sanitize`.

use docmirror_shared::Document;

use super::{ANY_SHAPE, PathShape, Stage};

/// Unwraps commented frontmatter and drops the title heading and analytics pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitize;

impl Stage for Sanitize {
    fn name(&self) -> &str {
        "sanitize"
    }

    fn accepts(&self) -> &[PathShape] {
        ANY_SHAPE
    }

    fn produces(&self) -> Option<PathShape> {
        None
    }

    fn apply(&self, mut doc: Document) -> Document {
        doc.body = docmirror_markdown::sanitize(&doc.body);
        doc
    }
}
