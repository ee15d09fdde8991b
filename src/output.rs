//! Output types returned by the conversion entry points.
//!
//! Everything here is plain data and serialisable, so the CLI can print it
//! with `--json` and callers can log or diff runs.

use crate::error::{FileError, ZtoqError};
use crate::pipeline::RuleKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How many constructs each rule rewrote in one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteCounts {
    /// Image references whose path changed.
    pub images: usize,
    /// `:::message` tokens turned into `:::note`.
    pub callouts: usize,
    /// `:::details` blocks turned into `<details>` markup.
    pub details: usize,
    /// Fenced spans copied through verbatim.
    pub fenced_spans: usize,
    /// Prose spans the rules ran over.
    pub prose_spans: usize,
}

impl RewriteCounts {
    /// Total number of rewrites across all rules.
    pub fn total(&self) -> usize {
        self.images + self.callouts + self.details
    }

    pub(crate) fn record(&mut self, kind: RuleKind, count: usize) {
        match kind {
            RuleKind::Images => self.images += count,
            RuleKind::Callouts => self.callouts += count,
            RuleKind::Details => self.details += count,
        }
    }

    /// Sum two tallies, e.g. across the files of a batch.
    pub fn merge(&mut self, other: &RewriteCounts) {
        self.images += other.images;
        self.callouts += other.callouts;
        self.details += other.details;
        self.fenced_spans += other.fenced_spans;
        self.prose_spans += other.prose_spans;
    }
}

/// A converted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Qiita-flavoured markdown.
    pub markdown: String,
    pub counts: RewriteCounts,
}

/// Statistics for one converted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub input: PathBuf,
    /// Where the result was written; `None` when it went to the caller
    /// (e.g. stdout).
    pub output: Option<PathBuf>,
    pub bytes_in: usize,
    pub bytes_out: usize,
    pub counts: RewriteCounts,
    pub duration_ms: u64,
}

/// Result of converting one file inside a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Present when the file converted successfully.
    pub stats: Option<ConversionStats>,
    /// Present when the file failed; the batch carries on regardless.
    pub error: Option<FileError>,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of [`crate::convert::convert_dir`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// One entry per input file, sorted by input path.
    pub files: Vec<FileResult>,
    pub converted: usize,
    pub failed: usize,
    /// Rewrite counts summed over every converted file.
    pub counts: RewriteCounts,
    pub duration_ms: u64,
}

impl BatchOutput {
    /// Treat any failed file as an error.
    pub fn into_result(self) -> Result<Self, ZtoqError> {
        if self.failed > 0 {
            Err(ZtoqError::PartialFailure {
                converted: self.converted,
                failed: self.failed,
                total: self.files.len(),
            })
        } else {
            Ok(self)
        }
    }
}

/// Tally kept by a watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSummary {
    /// Successful conversions, including the initial one.
    pub conversions: usize,
    /// Change events whose conversion failed.
    pub failures: usize,
}
