//! Rewrite pipeline for Zenn-to-Qiita conversion.
//!
//! The document is split into fenced and prose spans by [`fence`], and each
//! prose span runs through the rules in a fixed order. Fenced spans are
//! copied through untouched, so no rule ever sees text that crosses a fence
//! boundary.
//!
//! ## Data Flow
//!
//! ```text
//! document ──▶ fence ──▶ images ──▶ callout ──▶ details ──▶ document
//!             (spans)   (prose)    (prose)     (prose)    (reassembled)
//! ```
//!
//! 1. [`fence`]: classify lines as fenced code or prose
//! 2. [`images`]: drop `=WxH` size suffixes, prefix root-relative paths
//! 3. [`callout`]: `:::message` becomes `:::note`
//! 4. [`details`]: `:::details T … :::` becomes `<details><summary>T</summary> … </details>`

pub mod callout;
pub mod details;
pub mod fence;
pub mod images;

use crate::config::ConversionConfig;
use crate::output::{ConversionOutput, RewriteCounts};
use std::borrow::Cow;
use tracing::debug;

pub use callout::CalloutRewriter;
pub use details::DetailsRewriter;
pub use fence::{split_spans, Span, SpanKind};
pub use images::ImagePathRewriter;

/// Which rule produced a rewrite; used to tally [`RewriteCounts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Images,
    Callouts,
    Details,
}

/// Result of running one rule over one prose span.
#[derive(Debug)]
pub struct Rewritten<'a> {
    /// The rewritten prose; borrowed when nothing matched.
    pub text: Cow<'a, str>,
    /// Number of constructs the rule rewrote.
    pub count: usize,
}

impl<'a> Rewritten<'a> {
    pub(crate) fn new(text: Cow<'a, str>, count: usize) -> Self {
        Self { text, count }
    }
}

/// A pure `prose → prose` transformation.
///
/// Implementations hold no mutable state, so one instance can serve any
/// number of concurrent conversions.
pub trait RewriteRule: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn rewrite<'a>(&self, prose: &'a str) -> Rewritten<'a>;
}

/// The fence tracker plus the three rules, in their fixed order.
#[derive(Debug, Clone)]
pub struct Pipeline {
    images: ImagePathRewriter,
    callouts: CalloutRewriter,
    details: DetailsRewriter,
}

impl Pipeline {
    /// Build a pipeline that prefixes root-relative image paths with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            images: ImagePathRewriter::new(base_url),
            callouts: CalloutRewriter,
            details: DetailsRewriter,
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    /// Rules in application order. Images run first so the size-suffix and
    /// prefix step happens exactly once per document.
    fn rules(&self) -> [&dyn RewriteRule; 3] {
        [&self.images, &self.callouts, &self.details]
    }

    /// Convert one document.
    pub fn run(&self, document: &str) -> ConversionOutput {
        let spans = split_spans(document);
        let mut markdown = String::with_capacity(document.len() + 64);
        let mut counts = RewriteCounts::default();

        for span in &spans {
            match span.kind {
                SpanKind::Fenced => {
                    counts.fenced_spans += 1;
                    markdown.push_str(span.text);
                }
                SpanKind::Prose => {
                    counts.prose_spans += 1;
                    markdown.push_str(&self.rewrite_prose(span.text, &mut counts));
                }
            }
        }

        debug!(
            "Rewrote {} images, {} callouts, {} details across {} prose / {} fenced spans",
            counts.images, counts.callouts, counts.details, counts.prose_spans, counts.fenced_spans
        );

        ConversionOutput { markdown, counts }
    }

    fn rewrite_prose<'a>(&self, prose: &'a str, counts: &mut RewriteCounts) -> Cow<'a, str> {
        let mut text = Cow::Borrowed(prose);
        for rule in self.rules() {
            let out = rule.rewrite(&text);
            counts.record(rule.kind(), out.count);
            if let Cow::Owned(s) = out.text {
                text = Cow::Owned(s);
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://raw.githubusercontent.com/owner/repo/main";

    #[test]
    fn test_all_rules_apply_without_fences() {
        let input = "![a](/img/x.png =100x200)\n:::message\nhi\n:::\n:::details T\nbody\n:::\n";
        let out = Pipeline::new(BASE).run(input);
        assert_eq!(
            out.markdown,
            format!(
                "![a]({BASE}/img/x.png)\n:::note\nhi\n:::\n<details><summary>T</summary>\n\nbody\n</details>\n"
            )
        );
        assert_eq!(out.counts.images, 1);
        assert_eq!(out.counts.callouts, 1);
        assert_eq!(out.counts.details, 1);
        assert_eq!(out.counts.prose_spans, 1);
        assert_eq!(out.counts.fenced_spans, 0);
    }

    #[test]
    fn test_fenced_content_is_untouched() {
        let input = "```markdown\n![a](/img/x.png =1x2)\n:::message\n:::details T\nb\n:::\n```\n";
        let out = Pipeline::new(BASE).run(input);
        assert_eq!(out.markdown, input);
        assert_eq!(out.counts.total(), 0);
        assert_eq!(out.counts.fenced_spans, 1);
    }

    #[test]
    fn test_longer_fence_with_inner_backticks_is_untouched() {
        let input = "````md\n```\n:::message\n![a](/img/x.png)\n```\n````\n";
        assert_eq!(Pipeline::new("U").run(input).markdown, input);
    }

    #[test]
    fn test_tilde_fence_is_untouched() {
        let input = "~~~\n![a](/img/x.png)\n:::message\n~~~\n";
        assert_eq!(Pipeline::new("U").run(input).markdown, input);
    }

    #[test]
    fn test_info_string_line_does_not_end_fence() {
        let input = "```\n```js\n![a](/a.png)\n```\n![b](/b.png)\n";
        let out = Pipeline::new(BASE).run(input);
        assert_eq!(
            out.markdown,
            format!("```\n```js\n![a](/a.png)\n```\n![b]({BASE}/b.png)\n")
        );
        assert_eq!(out.counts.images, 1);
    }

    #[test]
    fn test_parenthesised_image_path() {
        let out = Pipeline::new("U").run("![a](/img/a(1).png =10x10)\n");
        assert_eq!(out.markdown, "![a](U/img/a(1).png)\n");
        assert_eq!(out.counts.images, 1);
    }

    #[test]
    fn test_prose_around_fence_is_rewritten() {
        let input = "![a](/a.png)\n```\n![b](/b.png)\n```\n![c](/c.png)\n";
        let out = Pipeline::new(BASE).run(input);
        assert_eq!(
            out.markdown,
            format!("![a]({BASE}/a.png)\n```\n![b](/b.png)\n```\n![c]({BASE}/c.png)\n")
        );
        assert_eq!(out.counts.images, 2);
        assert_eq!(out.counts.prose_spans, 2);
    }

    #[test]
    fn test_details_split_by_fence_is_left_alone() {
        // Opener and closer sit in different prose spans.
        let input = ":::details T\n```\ncode\n```\n:::\n";
        let out = Pipeline::new(BASE).run(input);
        assert_eq!(out.markdown, input);
    }

    #[test]
    fn test_plain_prose_round_trips() {
        let input = "# Heading\n\nA paragraph with `code` and a [link](/about).\n\n- item\n";
        let out = Pipeline::new(BASE).run(input);
        assert_eq!(out.markdown, input);
        assert!(matches!(
            Pipeline::new(BASE).rewrite_prose(input, &mut RewriteCounts::default()),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_callout_inside_details_body() {
        let input = ":::details Notes\n:::message alert\n";
        let out = Pipeline::new(BASE).run(input);
        assert_eq!(out.markdown, ":::details Notes\n:::note alert\n");
    }
}
