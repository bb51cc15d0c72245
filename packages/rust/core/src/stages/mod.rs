//! Transform stages and the plan that sequences them.
//!
//! Every stage is a pure `Document -> Document` map. Stages that read or
//! rewrite `meta.path` declare which [`PathShape`] they expect and which one
//! they leave behind; [`StagePlan::new`] walks the sequence and rejects any
//! ordering where a stage would see a path in the wrong shape.

mod links;
mod readme;
mod relocate;
mod sanitize;

use std::fmt;

use tracing::{debug, instrument};

use docmirror_shared::{DocMirrorError, Document, OutputConfig, Result};

pub use links::NormalizeLinks;
pub use readme::PromoteReadmes;
pub use relocate::RelocateToRoot;
pub use sanitize::Sanitize;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// What a document's `meta.path` looks like at a point in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    /// Repository-relative, source prefix applied.
    Source,
    /// Docs prefix stripped, relative to the output root.
    Rooted,
    /// Directory READMEs renamed to their sibling index files.
    Promoted,
}

impl fmt::Display for PathShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Rooted => "rooted",
            Self::Promoted => "promoted",
        })
    }
}

/// All shapes, for stages that never look at the path.
pub(crate) const ANY_SHAPE: &[PathShape] = &[PathShape::Source, PathShape::Rooted, PathShape::Promoted];

/// A single transform over document records.
pub trait Stage: Send + Sync {
    /// Human-readable stage name for tracing and errors.
    fn name(&self) -> &str;

    /// Path shapes this stage can run on.
    fn accepts(&self) -> &[PathShape];

    /// Shape the path has after this stage, or `None` when the path is untouched.
    fn produces(&self) -> Option<PathShape>;

    /// Transform one record.
    fn apply(&self, doc: Document) -> Document;
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// An ordered sequence of stages whose path contracts line up.
pub struct StagePlan {
    stages: Vec<Box<dyn Stage>>,
}

impl StagePlan {
    /// Validate `stages` against their path contracts, starting from source paths.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Result<Self> {
        let mut shape = PathShape::Source;
        let mut previous: Option<&str> = None;

        for stage in &stages {
            if !stage.accepts().contains(&shape) {
                let after = previous
                    .map(|name| format!(" after '{name}'"))
                    .unwrap_or_default();
                return Err(DocMirrorError::validation(format!(
                    "stage '{}' cannot run on {shape} paths{after}",
                    stage.name()
                )));
            }
            if let Some(next) = stage.produces() {
                shape = next;
            }
            previous = Some(stage.name());
        }

        Ok(Self { stages })
    }

    /// Relocate, sanitize, normalize links, promote READMEs.
    pub fn standard(output: &OutputConfig) -> Result<Self> {
        Self::new(vec![
            Box::new(RelocateToRoot::new(&output.docs_prefix)),
            Box::new(Sanitize),
            Box::new(NormalizeLinks::new(&output.link_mount)),
            Box::new(PromoteReadmes),
        ])
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over the full sequence, one stage at a time.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn run(&self, documents: Vec<Document>) -> Vec<Document> {
        self.stages.iter().fold(documents, |documents, stage| {
            let documents: Vec<Document> =
                documents.into_iter().map(|doc| stage.apply(doc)).collect();
            debug!(stage = stage.name(), documents = documents.len(), "stage applied");
            documents
        })
    }
}

impl fmt::Debug for StagePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagePlan")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmirror_shared::TreeEntry;

    fn doc(path: &str, body: &str) -> Document {
        Document::new(TreeEntry::blob(path, ""), body)
    }

    fn standard() -> StagePlan {
        StagePlan::standard(&OutputConfig::default()).unwrap()
    }

    #[test]
    fn standard_plan_order() {
        assert_eq!(
            standard().stage_names(),
            vec!["relocate-to-root", "sanitize", "link-normalize", "readme-promote"]
        );
    }

    #[test]
    fn promote_before_links_rejected() {
        let err = StagePlan::new(vec![
            Box::new(RelocateToRoot::new("docs/")),
            Box::new(Sanitize),
            Box::new(PromoteReadmes),
            Box::new(NormalizeLinks::new("/docs")),
        ])
        .unwrap_err();

        assert!(matches!(err, DocMirrorError::Validation { .. }));
        let message = err.to_string();
        assert!(message.contains("link-normalize"));
        assert!(message.contains("promoted"));
        assert!(message.contains("readme-promote"));
    }

    #[test]
    fn links_before_relocation_rejected() {
        let err = StagePlan::new(vec![Box::new(NormalizeLinks::new("/docs"))]).unwrap_err();
        assert!(err.to_string().contains("source paths"));
    }

    #[test]
    fn relocating_twice_rejected() {
        let result = StagePlan::new(vec![
            Box::new(RelocateToRoot::new("docs/")),
            Box::new(RelocateToRoot::new("docs/")),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn sanitize_runs_anywhere() {
        assert!(StagePlan::new(vec![Box::new(Sanitize)]).is_ok());
        assert!(
            StagePlan::new(vec![
                Box::new(RelocateToRoot::new("docs/")),
                Box::new(PromoteReadmes),
                Box::new(Sanitize),
            ])
            .is_ok()
        );
    }

    #[test]
    fn empty_plan_is_identity() {
        let plan = StagePlan::new(Vec::new()).unwrap();
        let docs = vec![doc("docs/a.md", "# A")];
        assert_eq!(plan.run(docs.clone()), docs);
    }

    #[test]
    fn standard_plan_transforms_guide() {
        let out = standard().run(vec![doc("docs/guide.md", "# Title\n[text](./other.md)")]);
        assert_eq!(out[0].meta.path, "guide.md");
        assert_eq!(out[0].body, "\n[text](/docs/other.md)");
    }

    #[test]
    fn links_resolve_against_pre_promotion_directory() {
        let out = standard().run(vec![doc(
            "docs/guides/setup/README.md",
            "See [install](./install.md) and [up](../index.md).",
        )]);

        assert_eq!(out[0].meta.path, "guides/setup.md");
        // Relative to guides/setup/, not guides/.
        assert_eq!(
            out[0].body,
            "See [install](/docs/guides/setup/install.md) and [up](/docs/guides/index.md)."
        );
    }

    #[test]
    fn order_and_count_preserved() {
        let docs = vec![
            doc("docs/b.md", "b"),
            doc("collectors/go.d.plugin/README.md", "c"),
            doc("docs/a.md", "a"),
        ];
        let out = standard().run(docs);
        let paths: Vec<_> = out.iter().map(|d| d.meta.path.as_str()).collect();
        assert_eq!(paths, vec!["b.md", "collectors/go.d.plugin.md", "a.md"]);
    }
}
