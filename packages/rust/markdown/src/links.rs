//! Inline link rewriting.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `[text](url)`, lazily matched on a single line. Image links match too.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("valid regex"));

/// True when `url` starts with an `http:` or `https:` scheme.
pub(crate) fn is_web_url(url: &str) -> bool {
    let lower = url.get(..6).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:")
}

/// Rewrite the target of every non-web inline link with `resolve`.
///
/// Web links are emitted unchanged. `resolve` receives the raw target text.
pub(crate) fn rewrite<F>(md: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> String,
{
    LINK_RE
        .replace_all(md, |caps: &Captures| {
            let text = &caps[1];
            let url = &caps[2];

            if is_web_url(url) {
                return caps[0].to_string();
            }

            format!("[{text}]({})", resolve(url))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixed(url: &str) -> String {
        format!("/mnt/{url}")
    }

    #[test]
    fn web_urls_detected_case_insensitively() {
        assert!(is_web_url("https://example.com"));
        assert!(is_web_url("HTTP://example.com"));
        assert!(!is_web_url("httpd.md"));
        assert!(!is_web_url("../http.md"));
        assert!(!is_web_url(""));
    }

    #[test]
    fn absolute_links_untouched() {
        let input = "[Site](https://netdata.cloud/docs) and [Plain](http://x.org)";
        assert_eq!(rewrite(input, prefixed), input);
    }

    #[test]
    fn relative_links_resolved() {
        let input = "See [the guide](guide.md) and [api](../api/README.md).";
        assert_eq!(
            rewrite(input, prefixed),
            "See [the guide](/mnt/guide.md) and [api](/mnt/../api/README.md)."
        );
    }

    #[test]
    fn image_inside_link_rewrites_inner_target() {
        let input = "[![badge](img/badge.svg)](https://ci.example.com)";
        assert_eq!(
            rewrite(input, prefixed),
            "[![badge](/mnt/img/badge.svg)](https://ci.example.com)"
        );
    }

    #[test]
    fn links_do_not_span_lines() {
        let input = "[broken\n](x.md)";
        assert_eq!(rewrite(input, prefixed), input);
    }
}
