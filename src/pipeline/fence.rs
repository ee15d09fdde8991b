//! Fence tracking: split a document into fenced and prose spans.
//!
//! Rewrite rules only ever see [`SpanKind::Prose`] spans, so anything inside
//! a code fence reaches the output byte-for-byte. A fence opens on a run of
//! three or more backticks or tildes and closes only on a bare run of the
//! same character that is at least as long as the opener. A fence that is
//! never closed keeps the rest of the document fenced.

use serde::{Deserialize, Serialize};

/// Classification of a [`Span`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    /// Code fence contents, including both delimiter lines. Never rewritten.
    Fenced,
    /// Ordinary markdown, subject to the rewrite rules.
    Prose,
}

/// A maximal run of lines sharing the same [`SpanKind`].
///
/// `text` borrows from the source document and keeps its line terminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub kind: SpanKind,
    pub text: &'a str,
}

impl Span<'_> {
    pub fn is_prose(&self) -> bool {
        self.kind == SpanKind::Prose
    }
}

/// The delimiter that opened the current fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    /// `` ` `` or `~`.
    marker: u8,
    /// Length of the opening run.
    length: usize,
}

/// Leading run of fence characters, plus whatever follows it on the line.
fn fence_run(line: &str) -> Option<(Fence, &str)> {
    let trimmed = line.trim_start();
    let marker = *trimmed.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let length = trimmed.bytes().take_while(|b| *b == marker).count();
    if length < 3 {
        return None;
    }
    Some((Fence { marker, length }, &trimmed[length..]))
}

fn opening_fence(line: &str) -> Option<Fence> {
    let (fence, info) = fence_run(line)?;
    // A backtick info string may not contain backticks (that is inline code).
    if fence.marker == b'`' && info.contains('`') {
        return None;
    }
    Some(fence)
}

fn closes(line: &str, open: Fence) -> bool {
    match fence_run(line) {
        Some((fence, rest)) => {
            fence.marker == open.marker && fence.length >= open.length && rest.trim().is_empty()
        }
        None => false,
    }
}

/// Does this line open a code fence?
///
/// Leading whitespace is ignored, so fences nested in list items count.
pub fn is_fence_marker(line: &str) -> bool {
    opening_fence(line).is_some()
}

/// Split `document` into spans whose concatenation is exactly `document`.
///
/// An empty document yields no spans.
pub fn split_spans(document: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut open: Option<Fence> = None;
    let mut current: Option<SpanKind> = None;
    let mut start = 0;
    let mut offset = 0;

    for line in document.split_inclusive('\n') {
        // Delimiter lines belong to the fenced span they open or close.
        let kind = match open {
            Some(fence) => {
                if closes(line, fence) {
                    open = None;
                }
                SpanKind::Fenced
            }
            None => match opening_fence(line) {
                Some(fence) => {
                    open = Some(fence);
                    SpanKind::Fenced
                }
                None => SpanKind::Prose,
            },
        };

        match current {
            Some(k) if k != kind => {
                spans.push(Span {
                    kind: k,
                    text: &document[start..offset],
                });
                start = offset;
                current = Some(kind);
            }
            Some(_) => {}
            None => current = Some(kind),
        }
        offset += line.len();
    }

    if let Some(kind) = current {
        spans.push(Span {
            kind,
            text: &document[start..],
        });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(spans: &[Span<'_>]) -> Vec<SpanKind> {
        spans.iter().map(|s| s.kind).collect()
    }

    fn rejoin(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_no_fences_is_single_prose_span() {
        let doc = "# Title\n\nSome text\nmore\n";
        let spans = split_spans(doc);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0], Span { kind: SpanKind::Prose, text: doc });
    }

    #[test]
    fn test_empty_document_has_no_spans() {
        assert!(split_spans("").is_empty());
    }

    #[test]
    fn test_delimiters_belong_to_fenced_span() {
        let doc = "before\n```rust\nlet x = 1;\n```\nafter";
        let spans = split_spans(doc);
        assert_eq!(
            kinds(&spans),
            vec![SpanKind::Prose, SpanKind::Fenced, SpanKind::Prose]
        );
        assert_eq!(spans[0].text, "before\n");
        assert_eq!(spans[1].text, "```rust\nlet x = 1;\n```\n");
        assert_eq!(spans[2].text, "after");
    }

    #[test]
    fn test_unterminated_fence_stays_fenced() {
        let doc = "intro\n```\n![a](/img/x.png)\n:::message\n";
        let spans = split_spans(doc);
        assert_eq!(kinds(&spans), vec![SpanKind::Prose, SpanKind::Fenced]);
        assert_eq!(spans[1].text, "```\n![a](/img/x.png)\n:::message\n");
    }

    #[test]
    fn test_adjacent_fences_coalesce() {
        let doc = "```\na\n```\n```\nb\n```\n";
        let spans = split_spans(doc);
        assert_eq!(kinds(&spans), vec![SpanKind::Fenced]);
    }

    #[test]
    fn test_indented_fence_is_marker() {
        assert!(is_fence_marker("   ```js\n"));
        assert!(is_fence_marker("\t````\n"));
        assert!(!is_fence_marker("``inline``\n"));
        assert!(!is_fence_marker("text ```\n"));
        assert!(is_fence_marker("~~~\n"));
        assert!(!is_fence_marker("~~\n"));
        assert!(!is_fence_marker("```js```\n"));
    }

    #[test]
    fn test_tilde_fence() {
        let doc = "~~~\n![a](/img/x.png)\n:::message\n~~~\nafter\n";
        let spans = split_spans(doc);
        assert_eq!(kinds(&spans), vec![SpanKind::Fenced, SpanKind::Prose]);
        assert_eq!(spans[1].text, "after\n");
    }

    #[test]
    fn test_longer_opener_keeps_shorter_run_inside() {
        let doc = "````md\n```\n:::message\n```\n````\nafter\n";
        let spans = split_spans(doc);
        assert_eq!(kinds(&spans), vec![SpanKind::Fenced, SpanKind::Prose]);
        assert_eq!(spans[0].text, "````md\n```\n:::message\n```\n````\n");
    }

    #[test]
    fn test_other_marker_does_not_close() {
        let doc = "```\n~~~\nstill code\n```\nafter";
        let spans = split_spans(doc);
        assert_eq!(kinds(&spans), vec![SpanKind::Fenced, SpanKind::Prose]);
        assert_eq!(spans[1].text, "after");
    }

    #[test]
    fn test_closer_with_info_string_does_not_close() {
        let doc = "```\n```rust\ncode\n```\nafter";
        let spans = split_spans(doc);
        assert_eq!(kinds(&spans), vec![SpanKind::Fenced, SpanKind::Prose]);
        assert_eq!(spans[0].text, "```\n```rust\ncode\n```\n");
    }

    #[test]
    fn test_longer_closer_closes() {
        let doc = "```\ncode\n`````  \r\nafter";
        let spans = split_spans(doc);
        assert_eq!(kinds(&spans), vec![SpanKind::Fenced, SpanKind::Prose]);
        assert_eq!(spans[1].text, "after");
    }

    #[test]
    fn test_reconstruction_is_exact() {
        let docs = [
            "",
            "plain",
            "a\r\n```\r\nb\r\n```\r\nc\r\n",
            "```\nonly code",
            "x\n\n```\n\n```\n\ny\n```md\nz",
        ];
        for doc in docs {
            assert_eq!(rejoin(&split_spans(doc)), doc, "doc: {doc:?}");
        }
    }

    #[test]
    fn test_spans_alternate_kinds() {
        let doc = "p1\n```\nc1\n```\np2\n```\nc2\n```\np3\n";
        let spans = split_spans(doc);
        for pair in spans.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
        assert_eq!(spans.len(), 5);
    }
}
