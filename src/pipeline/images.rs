//! Image path rewriting.
//!
//! Zenn serves article images from the repository root (`/images/foo.png`)
//! and accepts a display size after the path (`![alt](/images/foo.png =250x)`).
//! Qiita knows neither, so each image reference gets its size suffix dropped
//! and, when the path is root-relative, the configured base URL prepended
//! (typically the raw-content URL of the repository that hosts the images).
//!
//! Only complete `![alt](path)` references on a single line are touched.
//! The path may hold one level of balanced parentheses (`a(1).png`);
//! anything with unbalanced brackets or parentheses passes through as is.

use super::{RewriteRule, Rewritten, RuleKind};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static RE_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]\n]*)\]\(((?:[^()\n]|\([^()\n]*\))*)\)").unwrap());

// Matched on shape only: `=250x`, `=x100` and `=abcxdef` are all stripped.
static RE_SIZE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+=[^\s=]*x[^\s=]*$").unwrap());

/// Rewrites image references against a base URL.
#[derive(Debug, Clone, Default)]
pub struct ImagePathRewriter {
    base_url: String,
}

impl ImagePathRewriter {
    /// A trailing `/` on `base_url` is dropped so that joining with a
    /// root-relative path never produces `//`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        let trimmed = base_url.trim_end_matches('/').len();
        base_url.truncate(trimmed);
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Rewrite the path part of a single image reference.
    pub fn rewrite_path<'a>(&self, path: &'a str) -> Cow<'a, str> {
        let path = strip_size_suffix(path);
        if is_root_relative(path) && !self.base_url.is_empty() {
            Cow::Owned(format!("{}{}", self.base_url, path))
        } else {
            Cow::Borrowed(path)
        }
    }
}

impl RewriteRule for ImagePathRewriter {
    fn kind(&self) -> RuleKind {
        RuleKind::Images
    }

    fn rewrite<'a>(&self, prose: &'a str) -> Rewritten<'a> {
        let mut count = 0;
        let text = RE_IMAGE.replace_all(prose, |caps: &Captures<'_>| {
            let original = &caps[2];
            let path = self.rewrite_path(original);
            if path == original {
                caps[0].to_string()
            } else {
                count += 1;
                format!("![{}]({})", &caps[1], path)
            }
        });
        // replace_all allocates on any match; hand back the input when
        // every match was a no-op.
        let text = if count == 0 { Cow::Borrowed(prose) } else { text };
        Rewritten::new(text, count)
    }
}

/// Drop a trailing ` =WxH` size suffix, if any.
pub fn strip_size_suffix(path: &str) -> &str {
    match RE_SIZE_SUFFIX.find(path) {
        Some(m) => &path[..m.start()],
        None => path,
    }
}

/// `/images/a.png` is root-relative; `//cdn.example/a.png` and
/// `https://…` are not.
pub fn is_root_relative(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//")
}
