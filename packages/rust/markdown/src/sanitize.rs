//! Sanitize passes applied to every mirrored document body.
//!
//! Each pass is a function `&str -> String` applied in sequence and removes
//! at most one occurrence of its pattern. The order is fixed: the frontmatter
//! comment must be unwrapped before the heading pass runs.

use std::sync::LazyLock;

use regex::Regex;

/// Run the sanitize passes on a raw document body.
pub(crate) fn run_passes(md: &str) -> String {
    let mut result = unwrap_frontmatter_comment(md);
    result = strip_title_heading(&result);
    result = strip_analytics_pixel(&result);
    result
}

// ---------------------------------------------------------------------------
// Pass 1: Unwrap commented frontmatter
// ---------------------------------------------------------------------------

/// Remove an HTML comment wrapped around a leading `---` frontmatter block,
/// keeping the block itself.
fn unwrap_frontmatter_comment(md: &str) -> String {
    static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)\A<!--\s+(---\s+.*?\s+---)\s+-->").expect("valid regex")
    });

    FRONTMATTER_RE.replace(md, "$1").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 2: Strip the level 1 heading
// ---------------------------------------------------------------------------

/// Remove the first `# ` heading line; the site renders its own title.
fn strip_title_heading(md: &str) -> String {
    static H1_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?mR)^#\s+.*").expect("valid regex"));

    H1_RE.replace(md, "").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 3: Strip the analytics pixel
// ---------------------------------------------------------------------------

/// Remove the first `[![analytics]...` tracking image line.
fn strip_analytics_pixel(md: &str) -> String {
    static ANALYTICS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?mR)^\[!\[analytics\].*").expect("valid regex"));

    ANALYTICS_RE.replace(md, "").into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "[![analytics](https://www.google-analytics.com/collect?tid=UA-1&dp=%2Fdocs%2Fguide)](<>)";

    #[test]
    fn unwrap_frontmatter_keeps_block() {
        let input = "<!--\n---\ntitle: \"Guide\"\n---\n-->\n\nBody";
        let result = unwrap_frontmatter_comment(input);
        assert_eq!(result, "---\ntitle: \"Guide\"\n---\n\nBody");
    }

    #[test]
    fn unwrap_frontmatter_only_at_document_start() {
        let input = "Intro\n<!--\n---\ntitle: x\n---\n-->\n";
        assert_eq!(unwrap_frontmatter_comment(input), input);
    }

    #[test]
    fn unwrap_frontmatter_is_non_greedy() {
        let input = "<!--\n---\na: 1\n---\n-->\ntext\n<!--\n---\nb: 2\n---\n-->\n";
        let result = unwrap_frontmatter_comment(input);
        assert!(result.starts_with("---\na: 1\n---\ntext"));
        // The second comment is untouched.
        assert!(result.contains("<!--\n---\nb: 2\n---\n-->"));
    }

    #[test]
    fn strip_title_heading_removes_first_only() {
        let input = "Intro\n# Title\n\n## Section\n\n# Another";
        let result = strip_title_heading(input);
        assert_eq!(result, "Intro\n\n\n## Section\n\n# Another");
    }

    #[test]
    fn strip_title_heading_ignores_deeper_levels() {
        let input = "## Only a section\n\n### Deeper";
        assert_eq!(strip_title_heading(input), input);
    }

    #[test]
    fn strip_analytics_pixel_removes_line_content() {
        let input = format!("Text\n\n{PIXEL}\n");
        assert_eq!(strip_analytics_pixel(&input), "Text\n\n\n");
    }

    #[test]
    fn strip_analytics_pixel_requires_line_start() {
        let input = format!("See {PIXEL}");
        assert_eq!(strip_analytics_pixel(&input), input);
    }

    #[test]
    fn passes_apply_in_order() {
        let input = format!(
            "<!--\n---\ntitle: \"Guide\"\n---\n-->\n\n# Guide\n\nText\n\n{PIXEL}\n"
        );
        let result = run_passes(&input);
        assert_eq!(result, "---\ntitle: \"Guide\"\n---\n\n\n\nText\n\n\n");
    }

    #[test]
    fn crlf_line_endings_survive_removal() {
        let input = "# Title\r\nBody\r\n[![analytics](x)](<>)\r\nEnd\r\n";
        assert_eq!(run_passes(input), "\r\nBody\r\n\r\nEnd\r\n");
    }

    #[test]
    fn document_without_patterns_is_unchanged() {
        let input = "Plain text.\n\n## Section\n\n[link](other.md)\n";
        assert_eq!(run_passes(input), input);
    }
}
