//! Watch mode: re-convert a file every time it changes.
//!
//! A [`notify::PollWatcher`] checks the input every
//! [`ConversionConfig::poll_interval_ms`] and forwards events into a tokio
//! channel. Each change triggers a full [`convert_to_file`]. A failed
//! conversion is logged and counted but never ends the session; only the
//! caller's `shutdown` future does.

use crate::config::ConversionConfig;
use crate::convert::convert_to_file;
use crate::error::ZtoqError;
use crate::output::WatchSummary;
use notify::{Config, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Convert `input` to `output` now, then again on every modification,
/// until `shutdown` resolves.
///
/// # Errors
/// Only when the watcher cannot be started. Conversion failures are logged
/// and tallied in the returned [`WatchSummary`].
///
/// # Example
/// ```rust,no_run
/// # async fn run() -> Result<(), ztoq::ZtoqError> {
/// let config = ztoq::ConversionConfig::default();
/// let summary = ztoq::watch("articles/post.md", "public/", &config, async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await?;
/// eprintln!("{} conversions, {} failures", summary.conversions, summary.failures);
/// # Ok(())
/// # }
/// ```
pub async fn watch<F>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
    shutdown: F,
) -> Result<WatchSummary, ZtoqError>
where
    F: Future<Output = ()>,
{
    let input = input.as_ref();
    let output = output.as_ref();

    let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let notify_config = Config::default()
        .with_poll_interval(Duration::from_millis(config.poll_interval_ms))
        .with_compare_contents(true);
    let mut watcher = PollWatcher::new(
        move |res: notify::Result<Event>| {
            // The receiver is gone once the session has ended.
            let _ = tx.send(res);
        },
        notify_config,
    )
    .map_err(|e| watch_failed(input, e))?;
    watcher
        .watch(input, RecursiveMode::NonRecursive)
        .map_err(|e| watch_failed(input, e))?;

    let mut summary = WatchSummary::default();
    run_once(input, output, config, &mut summary).await;
    info!("Watching for changes...");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                debug!("Watch shutdown requested");
                break;
            }
            event = rx.recv() => match event {
                Some(Ok(event)) if is_change(&event.kind) => {
                    // One save often arrives as several events.
                    while rx.try_recv().is_ok() {}
                    debug!("Change detected: {:?}", event.kind);
                    run_once(input, output, config, &mut summary).await;
                }
                Some(Ok(event)) => debug!("Ignoring event: {:?}", event.kind),
                Some(Err(e)) => warn!("Watcher error on {}: {}", input.display(), e),
                None => break,
            },
        }
    }

    info!(
        "Stopped watching {} ({} conversions, {} failures)",
        input.display(),
        summary.conversions,
        summary.failures
    );
    Ok(summary)
}

async fn run_once(input: &Path, output: &Path, config: &ConversionConfig, summary: &mut WatchSummary) {
    match convert_to_file(input, output, config).await {
        Ok(_) => summary.conversions += 1,
        Err(e) => {
            summary.failures += 1;
            error!("Error processing: {}", e);
        }
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    )
}

fn watch_failed(path: &Path, source: notify::Error) -> ZtoqError {
    ZtoqError::WatchFailed {
        path: path.to_path_buf(),
        source,
    }
}
