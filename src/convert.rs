//! Conversion entry points.
//!
//! [`convert`] is the core operation: a pure, synchronous `&str → String`
//! call that never fails. Everything else in this module wraps it with file
//! I/O. Files are read as UTF-8, single files and directories are converted,
//! and output is written atomically so that an editor or a watcher never
//! sees a half-written file.

use crate::config::ConversionConfig;
use crate::error::{FileError, ZtoqError};
use crate::output::{BatchOutput, ConversionOutput, ConversionStats, FileResult, RewriteCounts};
use crate::pipeline::Pipeline;
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Convert a Zenn-flavoured markdown document to Qiita-flavoured markdown.
///
/// Root-relative image paths are prefixed with `base_url`. Text inside
/// fenced code blocks is copied through unchanged. Malformed extension
/// syntax is left as is, so this function is total.
///
/// # Example
/// ```rust
/// let out = ztoq::convert("![a](/img/x.png =100x200)", "https://cdn.test");
/// assert_eq!(out, "![a](https://cdn.test/img/x.png)");
/// ```
pub fn convert(document: &str, base_url: &str) -> String {
    Pipeline::new(base_url).run(document).markdown
}

/// Convert a document and report what was rewritten.
pub fn convert_with_config(document: &str, config: &ConversionConfig) -> ConversionOutput {
    Pipeline::from_config(config).run(document)
}

/// Read a markdown file and convert it.
///
/// # Errors
/// [`ZtoqError::FileNotFound`], [`ZtoqError::PermissionDenied`],
/// [`ZtoqError::InvalidUtf8`] or [`ZtoqError::ReadFailed`].
pub async fn convert_file(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ZtoqError> {
    let input = input.as_ref();
    let document = read_document(input).await?;
    Ok(convert_with_config(&document, config))
}

/// Convert a markdown file and write the result.
///
/// When `output` is an existing directory the file keeps its name and is
/// written inside it; otherwise `output` is the destination path. Missing
/// parent directories are created.
pub async fn convert_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, ZtoqError> {
    let start = Instant::now();
    let input = input.as_ref();
    let document = read_document(input).await?;
    let converted = convert_with_config(&document, config);

    let target = resolve_output_path(input, output.as_ref()).await?;
    write_atomic(&target, converted.markdown.as_bytes()).await?;
    info!("Output written to {}", target.display());

    Ok(ConversionStats {
        input: input.to_path_buf(),
        output: Some(target),
        bytes_in: document.len(),
        bytes_out: converted.markdown.len(),
        counts: converted.counts,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Convert every `*.md` file directly inside `input_dir` into `output_dir`.
///
/// At most `config.concurrency` files are in flight at once. A file that
/// fails is recorded in its [`FileResult`] and does not stop the others.
///
/// # Errors
/// Fatal only when `input_dir` cannot be listed or `output_dir` cannot be
/// created.
pub async fn convert_dir(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchOutput, ZtoqError> {
    let start = Instant::now();
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    let inputs = list_markdown_files(input_dir).await?;
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| ZtoqError::from_write(output_dir, e))?;

    let total = inputs.len();
    info!(
        "Converting {} files from {} to {}",
        total,
        input_dir.display(),
        output_dir.display()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut files: Vec<FileResult> = stream::iter(inputs.into_iter().map(|input| async move {
        // list_markdown_files only returns entries with a file name.
        let target = output_dir.join(input.file_name().unwrap_or_default());
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(&input);
        }
        match convert_to_file(&input, &target, config).await {
            Ok(stats) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(&input, &stats);
                }
                FileResult {
                    input,
                    output: target,
                    stats: Some(stats),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", input.display(), e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(&input, &e.to_string());
                }
                FileResult {
                    error: Some(FileError::from_fatal(&input, &e)),
                    input,
                    output: target,
                    stats: None,
                }
            }
        }
    }))
    .buffer_unordered(config.concurrency)
    .collect()
    .await;

    files.sort_by(|a, b| a.input.cmp(&b.input));

    let converted = files.iter().filter(|f| f.is_success()).count();
    let failed = total - converted;
    let mut counts = RewriteCounts::default();
    for stats in files.iter().filter_map(|f| f.stats.as_ref()) {
        counts.merge(&stats.counts);
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, converted);
    }
    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {}/{} files, {}ms total",
        converted, total, duration_ms
    );

    Ok(BatchOutput {
        files,
        converted,
        failed,
        counts,
        duration_ms,
    })
}

/// Decide where the converted file goes.
///
/// An existing directory gets `<dir>/<input file name>`; anything else is
/// taken as the destination file itself.
pub async fn resolve_output_path(input: &Path, output: &Path) -> Result<PathBuf, ZtoqError> {
    let is_dir = tokio::fs::metadata(output)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Ok(output.to_path_buf());
    }
    let name = input.file_name().ok_or_else(|| ZtoqError::InvalidInput {
        path: input.to_path_buf(),
    })?;
    Ok(output.join(name))
}

// ── Internal helpers ─────────────────────────────────────────────────────

pub(crate) async fn read_document(path: &Path) -> Result<String, ZtoqError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ZtoqError::from_read(path, e))?;
    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text)
}

/// Write via a temp file in the destination directory, then rename.
///
/// An existing destination keeps its permissions; a new one gets the usual
/// `0644` minus the umask.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ZtoqError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&parent)
        .await
        .map_err(|e| ZtoqError::from_write(path, e))?;

    let target = path.to_path_buf();
    let contents = contents.to_vec();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut tmp = temp_file_in(&parent)?;
        tmp.write_all(&contents)?;
        if let Ok(meta) = std::fs::metadata(&target) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| ZtoqError::Internal(format!("write task failed: {e}")))?
    .map_err(|e| ZtoqError::from_write(path, e))
}

#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o644))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

/// Regular `*.md` files directly under `dir`, sorted by path.
async fn list_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, ZtoqError> {
    let meta = tokio::fs::metadata(dir)
        .await
        .map_err(|e| ZtoqError::from_read(dir, e))?;
    if !meta.is_dir() {
        return Err(ZtoqError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ZtoqError::from_read(dir, e))?;
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ZtoqError::from_read(dir, e))?
    {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file && is_markdown(&path) {
            files.push(path);
        }
    }
    files.sort();
    debug!("Found {} markdown files in {}", files.len(), dir.display());
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}
