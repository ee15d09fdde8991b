//! Error types for the ztoq library.
//!
//! The rewrite pipeline itself never fails: malformed extension syntax is
//! left as is. Errors only come from the file and watch layers around it.
//!
//! * [`ZtoqError`] is **fatal**: the requested operation cannot proceed
//!   (input missing, output not writable, watcher could not start). Returned
//!   as `Err(ZtoqError)` from the `convert_*` and `watch` functions.
//!
//! * [`FileError`] is **non-fatal**: one file of a directory batch failed,
//!   the rest are fine. Stored inside [`crate::output::FileResult`] so the
//!   caller sees partial success instead of losing the whole batch.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// All fatal errors returned by the ztoq library.
#[derive(Debug, Error)]
pub enum ZtoqError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but is not valid UTF-8 text.
    #[error("File '{path}' is not valid UTF-8 text")]
    InvalidUtf8 { path: PathBuf },

    /// Any other read failure.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The path has no file name to derive an output name from.
    #[error("Invalid input '{path}': expected a file path")]
    InvalidInput { path: PathBuf },

    /// A directory was required (batch input) but the path is not one.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Some files of a batch converted, at least one failed.
    ///
    /// Returned by [`crate::output::BatchOutput::into_result`] when the
    /// caller wants any failure to count as an error.
    #[error("{failed}/{total} files failed during conversion")]
    PartialFailure {
        converted: usize,
        failed: usize,
        total: usize,
    },

    // ── Watch errors ──────────────────────────────────────────────────────
    /// The file watcher could not be created or could not watch the path.
    #[error("Failed to watch '{path}': {source}")]
    WatchFailed {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ZtoqError {
    /// Classify an I/O error raised while reading `path`.
    pub fn from_read(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => ZtoqError::FileNotFound { path },
            io::ErrorKind::PermissionDenied => ZtoqError::PermissionDenied { path },
            // tokio::fs::read_to_string reports bad UTF-8 as InvalidData.
            io::ErrorKind::InvalidData => ZtoqError::InvalidUtf8 { path },
            _ => ZtoqError::ReadFailed { path, source },
        }
    }

    pub fn from_write(path: &Path, source: io::Error) -> Self {
        ZtoqError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A non-fatal error for a single file of a batch.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum FileError {
    /// The input could not be read.
    #[error("{path}: read failed: {detail}")]
    ReadFailed { path: PathBuf, detail: String },

    /// The converted output could not be written.
    #[error("{path}: write failed: {detail}")]
    WriteFailed { path: PathBuf, detail: String },
}

impl FileError {
    /// Downgrade a fatal error from one file's conversion.
    pub fn from_fatal(input: &Path, err: &ZtoqError) -> Self {
        match err {
            ZtoqError::OutputWriteFailed { path, .. } => FileError::WriteFailed {
                path: path.clone(),
                detail: err.to_string(),
            },
            _ => FileError::ReadFailed {
                path: input.to_path_buf(),
                detail: err.to_string(),
            },
        }
    }
}
