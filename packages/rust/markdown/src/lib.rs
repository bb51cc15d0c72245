//! Text rules for mirrored markdown documents.
//!
//! - [`sanitize`] strips presentation artifacts the site renders on its own
//!   (commented frontmatter wrapper, title heading, analytics pixel).
//! - [`rewrite_relative_links`] hands every non-web inline link target to a
//!   resolver and substitutes the result.
//!
//! Path semantics (what a relative target resolves to) live in the caller;
//! this crate only knows the markdown syntax.

mod links;
mod sanitize;

use tracing::trace;

/// Apply the sanitize passes to a document body.
pub fn sanitize(md: &str) -> String {
    let result = sanitize::run_passes(md);
    trace!(before = md.len(), after = result.len(), "sanitized body");
    result
}

/// Rewrite every inline link whose target is not an `http(s)` URL.
///
/// `resolve` is called once per relative link, in document order.
pub fn rewrite_relative_links<F>(md: &str, resolve: F) -> String
where
    F: FnMut(&str) -> String,
{
    links::rewrite(md, resolve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_then_rewrite() {
        let input = "# Title\n[text](./other.md) [ext](https://example.com)";
        let cleaned = sanitize(input);
        let mut seen = Vec::new();
        let result = rewrite_relative_links(&cleaned, |url| {
            seen.push(url.to_string());
            format!("/docs/{}", url.trim_start_matches("./"))
        });

        assert_eq!(result, "\n[text](/docs/other.md) [ext](https://example.com)");
        assert_eq!(seen, vec!["./other.md".to_string()]);
    }
}
