//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while [`crate::convert::convert_dir`] works through a directory.
//! The CLI uses it to drive a progress bar; a library caller might forward
//! events to a channel or a log instead.
//!
//! # Example
//!
//! ```rust
//! use ztoq::{ConversionConfig, ConversionProgressCallback, ConversionStats};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, input: &Path, stats: &ConversionStats) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} done ({} rewrites)", input.display(), stats.counts.total());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionStats;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch converter as it processes each file.
///
/// Files are converted concurrently, so `on_file_*` methods may be called
/// from several tasks at once and in any order. All methods default to
/// no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, before any file is read.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    fn on_file_start(&self, input: &Path) {
        let _ = input;
    }

    fn on_file_complete(&self, input: &Path, stats: &ConversionStats) {
        let _ = (input, stats);
    }

    /// Called when a file fails; the batch continues.
    fn on_file_error(&self, input: &Path, error: &str) {
        let _ = (input, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A callback that ignores every event.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
