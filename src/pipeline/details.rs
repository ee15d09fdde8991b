//! Collapsible sections: `:::details T` … `:::` → `<details>` markup.
//!
//! Each opener pairs with the nearest bare `:::` line that follows it; Zenn
//! does not nest these blocks. The body is copied verbatim. An opener without a
//! title, or without a closing line in the same prose span, is left as is.
//! A block whose body contains a code fence is therefore never converted:
//! the fence splits it across prose spans, so its opener and closer pass
//! through unchanged.

use super::{RewriteRule, Rewritten, RuleKind};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

// 1: title, 2: line ending of the opener, 3: body (may be empty).
// CRLF mode keeps the closer's `\r` out of the match.
static RE_DETAILS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mR)^:::details[ \t]+([^\r\n]*\S)[ \t]*(\r?\n)(?s:(.*?))^:::[ \t]*$").unwrap()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct DetailsRewriter;

impl RewriteRule for DetailsRewriter {
    fn kind(&self) -> RuleKind {
        RuleKind::Details
    }

    fn rewrite<'a>(&self, prose: &'a str) -> Rewritten<'a> {
        let mut count = 0;
        let text = RE_DETAILS.replace_all(prose, |caps: &Captures<'_>| {
            count += 1;
            render_details(&caps[1], &caps[3], &caps[2])
        });
        Rewritten::new(text, count)
    }
}

/// Disclosure markup for one block. `body` keeps its own trailing newline;
/// `newline` is the opener's line ending, reused for the blank separator.
pub fn render_details(title: &str, body: &str, newline: &str) -> String {
    format!("<details><summary>{title}</summary>{newline}{newline}{body}</details>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(input: &str) -> String {
        DetailsRewriter.rewrite(input).text.into_owned()
    }

    #[test]
    fn test_single_block() {
        assert_eq!(
            rewrite(":::details Title\nContent\n:::"),
            "<details><summary>Title</summary>\n\nContent\n</details>"
        );
    }

    #[test]
    fn test_multiple_blocks() {
        let input = ":::details Title1\nContent1\n:::\n:::details Title2\nContent2\n:::";
        let out = DetailsRewriter.rewrite(input);
        assert_eq!(
            out.text,
            "<details><summary>Title1</summary>\n\nContent1\n</details>\n\
             <details><summary>Title2</summary>\n\nContent2\n</details>"
        );
        assert_eq!(out.count, 2);
    }

    #[test]
    fn test_no_details_passthrough() {
        let input = "This is a test with no toggle.";
        let out = DetailsRewriter.rewrite(input);
        assert_eq!(out.text, input);
        assert!(matches!(out.text, Cow::Borrowed(_)));
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(
            rewrite(":::details Title\n:::"),
            "<details><summary>Title</summary>\n\n</details>"
        );
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(
            rewrite(":::details Title with !@#$%^&*()\nContent with <>&\n:::"),
            "<details><summary>Title with !@#$%^&*()</summary>\n\nContent with <>&\n</details>"
        );
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(rewrite(""), "");
    }

    #[test]
    fn test_multi_line_body() {
        assert_eq!(
            rewrite(":::details Multi-line Title\nLine 1\nLine 2\nLine 3\n:::"),
            "<details><summary>Multi-line Title</summary>\n\nLine 1\nLine 2\nLine 3\n</details>"
        );
    }

    #[test]
    fn test_pairs_with_nearest_closer() {
        let input = ":::details A\none\n:::\nbetween\n:::\n";
        assert_eq!(
            rewrite(input),
            "<details><summary>A</summary>\n\none\n</details>\nbetween\n:::\n"
        );
    }

    #[test]
    fn test_closer_must_be_bare() {
        // `:::note` is not a closer, so the block ends at the bare `:::`.
        let input = ":::details A\n:::note\nx\n:::\n";
        assert_eq!(
            rewrite(input),
            "<details><summary>A</summary>\n\n:::note\nx\n</details>\n"
        );
    }

    #[test]
    fn test_unclosed_block_untouched() {
        let input = ":::details A\nbody without end\n";
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn test_missing_title_untouched() {
        let input = ":::details\nbody\n:::";
        assert_eq!(rewrite(input), input);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            rewrite(":::details T\r\nB\r\n:::\r\n"),
            "<details><summary>T</summary>\r\n\r\nB\r\n</details>\r\n"
        );
    }

    #[test]
    fn test_trailing_spaces_trimmed_from_title() {
        assert_eq!(
            rewrite(":::details  Spaced title  \nx\n:::  "),
            "<details><summary>Spaced title</summary>\n\nx\n</details>"
        );
    }
}
