//! `:::message` → `:::note`.
//!
//! A token substitution, not a block parse: the closing `:::` is the same in
//! both dialects, so only the opening token changes. Anything after the token
//! (`:::message alert`) is kept, and Qiita reads it the same way.

use super::{RewriteRule, Rewritten, RuleKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static RE_MESSAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r":::message\b").unwrap());

const NOTE: &str = ":::note";

#[derive(Debug, Clone, Copy, Default)]
pub struct CalloutRewriter;

impl RewriteRule for CalloutRewriter {
    fn kind(&self) -> RuleKind {
        RuleKind::Callouts
    }

    fn rewrite<'a>(&self, prose: &'a str) -> Rewritten<'a> {
        let count = RE_MESSAGE.find_iter(prose).count();
        if count == 0 {
            return Rewritten::new(Cow::Borrowed(prose), 0);
        }
        Rewritten::new(RE_MESSAGE.replace_all(prose, NOTE), count)
    }
}
