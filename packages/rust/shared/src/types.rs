//! Core domain types: remote tree entries and the documents built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

/// Node type of a tree entry, as reported in the listing's `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// File content node.
    Blob,
    /// Directory node.
    Tree,
    /// Anything else (submodule `commit`, future kinds).
    Other(String),
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Other(kind) => kind,
        }
    }
}

impl From<&str> for EntryKind {
    fn from(s: &str) -> Self {
        match s {
            "blob" => Self::Blob,
            "tree" => Self::Tree,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for EntryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

// ---------------------------------------------------------------------------
// TreeEntry
// ---------------------------------------------------------------------------

/// One row of a repository's recursive file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Slash-separated path relative to the repository root.
    pub path: String,
    /// Node type.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Opaque content-retrieval handle (the blob API URL).
    #[serde(default)]
    pub url: String,
    /// Object id, when the listing provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Size in bytes (blobs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl TreeEntry {
    /// Build a blob entry; mostly useful for tests and fixtures.
    pub fn blob(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
            url: url.into(),
            sha: None,
            size: None,
        }
    }

    /// Build a directory entry.
    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
            url: String::new(),
            sha: None,
            size: None,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The unit the transform pipeline operates on.
///
/// `meta.path` is the output-relative path and changes as stages run;
/// it is always slash-separated and never absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub meta: TreeEntry,
    pub body: String,
}

impl Document {
    pub fn new(meta: TreeEntry, body: impl Into<String>) -> Self {
        Self {
            meta,
            body: body.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RateLimit
// ---------------------------------------------------------------------------

/// API quota for the calling credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: DateTime<Utc>,
}

impl RateLimit {
    /// Whole minutes until the quota resets, rounded up; zero once passed.
    pub fn resets_in_minutes(&self, now: DateTime<Utc>) -> i64 {
        let millis = (self.reset - now).num_milliseconds();
        if millis <= 0 {
            return 0;
        }
        (millis + 59_999) / 60_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn tree_entry_deserializes_api_row() {
        let json = r#"{
            "path": "docs/guide.md",
            "mode": "100644",
            "type": "blob",
            "sha": "abc123",
            "size": 42,
            "url": "https://api.github.com/repos/o/r/git/blobs/abc123"
        }"#;
        let entry: TreeEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(entry.path, "docs/guide.md");
        assert!(entry.is_blob());
        assert_eq!(entry.size, Some(42));
        assert!(entry.url.ends_with("/abc123"));
    }

    #[test]
    fn entry_kind_keeps_unknown_types() {
        let json = r#"{"path": "vendor/lib", "type": "commit", "sha": "def"}"#;
        let entry: TreeEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(entry.kind, EntryKind::Other("commit".into()));
        assert_eq!(entry.url, "");

        let back = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(back["type"], "commit");
    }

    #[test]
    fn reset_minutes_round_up() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let rate = RateLimit {
            limit: 5000,
            remaining: 4990,
            reset: now + chrono::Duration::seconds(61),
        };
        assert_eq!(rate.resets_in_minutes(now), 2);

        let past = RateLimit {
            reset: now - chrono::Duration::seconds(5),
            ..rate
        };
        assert_eq!(past.resets_in_minutes(now), 0);
    }
}
