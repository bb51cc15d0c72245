//! Output tree publisher.
//!
//! Writes the transformed documents into a staging directory next to the
//! output root, then swaps it into place with renames. The previous tree is
//! only removed once the new one is in position, so a failed run leaves the
//! old output intact.
//!
//! ```text
//! <parent>/
//! ├── docs/                          (output root, replaced)
//! ├── .docs.staging-<uuid>/          (new tree while writing)
//! └── .docs.old-<uuid>/              (previous tree during the swap)
//! ```

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use docmirror_shared::{DocMirrorError, Document, Result};

/// Output from a successful publish.
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// The output root that now holds the new tree.
    pub root: PathBuf,
    /// Output-relative paths written, in pipeline order.
    pub paths: Vec<String>,
    /// Number of files written.
    pub files_written: usize,
    /// Records dropped because a later record lowercased to the same path.
    pub collisions: usize,
}

/// Output-relative path a document is written to.
pub fn output_path(doc: &Document) -> String {
    doc.meta.path.to_lowercase()
}

/// Pair every document with its output path, keeping the last record for
/// each path. The result is ordered by first appearance.
pub fn plan_outputs(documents: &[Document]) -> (Vec<(String, &Document)>, usize) {
    let mut planned: Vec<(String, &Document)> = Vec::with_capacity(documents.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(documents.len());
    let mut collisions = 0;

    for doc in documents {
        let path = output_path(doc);
        match index.get(&path) {
            Some(&slot) => {
                warn!(
                    output = %path,
                    replaced = %planned[slot].1.meta.path,
                    by = %doc.meta.path,
                    "output path collision, keeping the later document"
                );
                planned[slot].1 = doc;
                collisions += 1;
            }
            None => {
                index.insert(path.clone(), planned.len());
                planned.push((path, doc));
            }
        }
    }

    (planned, collisions)
}

/// Replace the tree at `root` with `documents`.
#[instrument(skip_all, fields(root = %root.display(), documents = documents.len()))]
pub fn publish(root: &Path, documents: &[Document]) -> Result<PublishResult> {
    let (planned, collisions) = plan_outputs(documents);
    for (path, _) in &planned {
        check_relative(path)?;
    }

    let (parent, name) = split_root(root)?;
    std::fs::create_dir_all(&parent).map_err(|e| DocMirrorError::io(&parent, e))?;

    let run_id = Uuid::now_v7();
    let staging = parent.join(format!(".{name}.staging-{run_id}"));

    if let Err(err) = write_tree(&staging, &planned) {
        discard(&staging);
        return Err(err);
    }

    if let Err(err) = swap_into_place(&staging, root, &parent.join(format!(".{name}.old-{run_id}"))) {
        discard(&staging);
        return Err(err);
    }

    info!(files = planned.len(), collisions, "published output tree");

    Ok(PublishResult {
        root: root.to_path_buf(),
        files_written: planned.len(),
        paths: planned.into_iter().map(|(path, _)| path).collect(),
        collisions,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Output paths must stay inside the root.
fn check_relative(path: &str) -> Result<()> {
    let escapes = path.is_empty()
        || Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(DocMirrorError::validation(format!(
            "output path '{path}' is not a relative path inside the output root"
        )));
    }
    Ok(())
}

fn split_root(root: &Path) -> Result<(PathBuf, String)> {
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            DocMirrorError::config(format!(
                "output root {} must name a directory",
                root.display()
            ))
        })?
        .to_string();

    let parent = match root.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((parent, name))
}

fn write_tree(staging: &Path, planned: &[(String, &Document)]) -> Result<()> {
    std::fs::create_dir_all(staging).map_err(|e| DocMirrorError::io(staging, e))?;

    for (path, doc) in planned {
        let file_path = staging.join(path);
        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| DocMirrorError::io(dir, e))?;
        }
        std::fs::write(&file_path, &doc.body).map_err(|e| DocMirrorError::io(&file_path, e))?;
        debug!(path = %path, bytes = doc.body.len(), "wrote document");
    }

    Ok(())
}

fn swap_into_place(staging: &Path, root: &Path, backup: &Path) -> Result<()> {
    let had_previous = root.exists();
    if had_previous {
        std::fs::rename(root, backup).map_err(|e| DocMirrorError::io(root, e))?;
    }

    if let Err(e) = std::fs::rename(staging, root) {
        if had_previous {
            // Put the old tree back so the output is never missing.
            if let Err(restore) = std::fs::rename(backup, root) {
                warn!(backup = %backup.display(), error = %restore, "failed to restore previous output");
            }
        }
        return Err(DocMirrorError::io(root, e));
    }

    if had_previous {
        std::fs::remove_dir_all(backup).map_err(|e| DocMirrorError::io(backup, e))?;
        debug!(path = %backup.display(), "removed previous output");
    }

    Ok(())
}

fn discard(staging: &Path) {
    if let Err(e) = std::fs::remove_dir_all(staging) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %staging.display(), error = %e, "failed to remove staging directory");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
