//! Response bodies of the GitHub REST endpoints we call, and blob decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use docmirror_shared::{DocMirrorError, RateLimit, Result, TreeEntry};

/// `GET /rate_limit`
#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResponse {
    pub rate: RateBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateBody {
    pub limit: u64,
    pub remaining: u64,
    /// Unix epoch seconds.
    pub reset: i64,
}

impl RateBody {
    pub fn into_rate_limit(self) -> Result<RateLimit> {
        let reset: DateTime<Utc> = DateTime::from_timestamp(self.reset, 0).ok_or_else(|| {
            DocMirrorError::decode(format!("rate limit reset {} out of range", self.reset))
        })?;
        Ok(RateLimit {
            limit: self.limit,
            remaining: self.remaining,
            reset,
        })
    }
}

/// `GET /repos/{owner}/{repo}/branches/{branch}`
#[derive(Debug, Deserialize)]
pub(crate) struct BranchResponse {
    pub commit: CommitRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitRef {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/git/trees/{sha}?recursive=true`
#[derive(Debug, Deserialize)]
pub(crate) struct TreeResponse {
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// `GET /repos/{owner}/{repo}/git/blobs/{sha}`
#[derive(Debug, Deserialize)]
pub(crate) struct BlobResponse {
    pub content: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "base64".into()
}

impl BlobResponse {
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if self.encoding != "base64" {
            return Err(DocMirrorError::decode(format!(
                "unsupported blob encoding '{}'",
                self.encoding
            )));
        }
        decode_base64(&self.content)
    }
}

/// Decode a base64 payload; GitHub wraps it at 60 columns, so whitespace is ignored.
pub(crate) fn decode_base64(content: &str) -> Result<Vec<u8>> {
    let compact: String = content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DocMirrorError::decode(format!("invalid base64 content: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_ignores_line_wrapping() {
        // "# Title\nbody\n" split across lines the way the API returns it
        let wrapped = "IyBUaXRs\nZQpib2R5\nCg==\n";
        let bytes = decode_base64(wrapped).expect("decode");
        assert_eq!(bytes, b"# Title\nbody\n");
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_base64("not*base64!").unwrap_err();
        assert!(err.to_string().starts_with("decode error"));
    }

    #[test]
    fn blob_with_other_encoding_is_rejected() {
        let blob = BlobResponse {
            content: "hello".into(),
            encoding: "utf-8".into(),
        };
        assert!(blob.into_bytes().unwrap_err().to_string().contains("utf-8"));
    }

    #[test]
    fn rate_body_converts_epoch() {
        let body = RateBody {
            limit: 5000,
            remaining: 4321,
            reset: 1_700_000_000,
        };
        let rate = body.into_rate_limit().expect("convert");
        assert_eq!(rate.reset.timestamp(), 1_700_000_000);
        assert_eq!(rate.remaining, 4321);
    }
}
