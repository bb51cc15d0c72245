//! Slash-separated path helpers for document paths and site links.
//!
//! Document paths are repository-relative strings, not OS paths, so these
//! helpers never touch `std::path` and behave the same on every platform.

use docmirror_shared::TreeEntry;

/// Push the segments of `path` onto `stack`, dropping empty and `.` segments.
///
/// `..` pops the previous segment. With `clamp` set (absolute paths) a `..`
/// at the root is dropped; otherwise it is kept as a leading `..`.
fn push_segments<'a>(stack: &mut Vec<&'a str>, path: &'a str, clamp: bool) {
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match stack.last() {
                Some(&last) if last != ".." => {
                    stack.pop();
                }
                _ if clamp => {}
                _ => stack.push(".."),
            },
            other => stack.push(other),
        }
    }
}

/// Join relative path pieces and collapse redundant separators, `.` and `..`.
///
/// Returns `.` when everything cancels out.
pub fn join(base: &str, path: &str) -> String {
    let mut stack = Vec::new();
    push_segments(&mut stack, base, false);
    push_segments(&mut stack, path, false);

    if stack.is_empty() {
        ".".to_string()
    } else {
        stack.join("/")
    }
}

/// Join pieces into a normalized absolute path (`/a/b`).
///
/// `..` never climbs above `/`. A trailing `/` on the last non-empty piece is
/// kept, so directory links stay directory links.
pub fn join_absolute(parts: &[&str]) -> String {
    let mut stack = Vec::new();
    for part in parts {
        push_segments(&mut stack, part, true);
    }

    let mut joined = format!("/{}", stack.join("/"));
    let trailing_slash = parts
        .iter()
        .rev()
        .find(|p| !p.is_empty())
        .is_some_and(|p| p.ends_with('/'));
    if trailing_slash && !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}

/// Return `path` without `prefix` when it starts with it, unchanged otherwise.
pub fn strip_dir_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }
    path.strip_prefix(prefix).unwrap_or(path)
}

/// Place every entry under `prefix`, normalizing the joined path.
pub fn prefix_entries(entries: Vec<TreeEntry>, prefix: &str) -> Vec<TreeEntry> {
    entries
        .into_iter()
        .map(|mut entry| {
            entry.path = join(prefix, &entry.path);
            entry
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PathParts
// ---------------------------------------------------------------------------

/// Components of a slash-separated file path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathParts<'a> {
    /// Everything before the last `/` (empty at the root).
    pub dir: &'a str,
    /// File name including extension.
    pub base: &'a str,
    /// Extension including the dot (`.md`), empty when there is none.
    pub ext: &'a str,
}

impl<'a> PathParts<'a> {
    pub fn parse(path: &'a str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let (dir, base) = match trimmed.rfind('/') {
            Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
            None => ("", trimmed),
        };

        // A leading dot marks a hidden file, not an extension.
        let ext = match base.rfind('.') {
            Some(idx) if idx > 0 => &base[idx..],
            _ => "",
        };

        Self { dir, base, ext }
    }
}
