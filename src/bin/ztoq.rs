//! CLI binary for ztoq.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use ztoq::{
    convert_dir, convert_file, convert_to_file, watch, ConversionConfig,
    ConversionProgressCallback, ConversionStats, ProgressCallback,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback for directory batches: one bar plus a log line
/// per file. Files finish out of order, so lines are printed as they land.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Bar length is set by `on_batch_start` once the directory is listed.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} files…"))
        ));
    }

    fn on_file_start(&self, input: &Path) {
        self.bar.set_message(file_label(input));
    }

    fn on_file_complete(&self, input: &Path, stats: &ConversionStats) {
        self.bar.println(format!(
            "  {} {:<32}  {}",
            green("✓"),
            file_label(input),
            dim(&format!(
                "{} images, {} callouts, {} details",
                stats.counts.images, stats.counts.callouts, stats.counts.details
            )),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, input: &Path, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((idx, _)) => format!("{}\u{2026}", &error[..idx]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} {:<32}  {}",
            red("✗"),
            file_label(input),
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = total_files.saturating_sub(success_count);
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert to stdout
  ztoq articles/my-post.md

  # Convert into a directory (file name is kept)
  ztoq articles/my-post.md public/

  # Prefix image paths with the raw GitHub URL of the article repository
  ztoq --base-url https://raw.githubusercontent.com/me/blog/main articles/my-post.md public/

  # Re-convert on every save
  ztoq --watch articles/my-post.md public/my-post.md

  # Convert every article at once
  ztoq articles/ public/

WHAT GETS REWRITTEN:
  Zenn                              Qiita
  ────────────────────────────────  ─────────────────────────────────────────
  ![alt](/images/a.png =250x)       ![alt](<BASE_URL>/images/a.png)
  :::message                        :::note
  :::details Title … :::            <details><summary>Title</summary> … </details>

  Anything inside ``` or ~~~ fenced code blocks is left untouched.

ENVIRONMENT VARIABLES:
  ZTOQ_BASE_URL        Base URL for root-relative image paths
  ZTOQ_POLL_INTERVAL   Watch poll interval in milliseconds
  ZTOQ_CONCURRENCY     Files converted at once in directory mode
  RUST_LOG             Overrides the log filter (e.g. ztoq=debug)
"#;

/// Convert Zenn-flavoured Markdown to Qiita-flavoured Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "ztoq",
    version,
    about = "Convert Zenn-flavoured Markdown to Qiita-flavoured Markdown",
    long_about = "Convert Zenn-flavoured Markdown (image size suffixes, :::message callouts, \
:::details toggles) into its Qiita-flavoured equivalent, leaving fenced code blocks untouched.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file, or a directory of `.md` files.
    input: PathBuf,

    /// Output file or directory. Prints to stdout when omitted.
    output: Option<PathBuf>,

    /// URL prepended to root-relative image paths.
    #[arg(long, env = "ZTOQ_BASE_URL", default_value = "")]
    base_url: String,

    /// Re-convert whenever the input file changes.
    #[arg(short, long)]
    watch: bool,

    /// Watch poll interval in milliseconds.
    #[arg(long, env = "ZTOQ_POLL_INTERVAL", default_value_t = 1000)]
    poll_interval: u64,

    /// Files converted at once in directory mode.
    #[arg(short, long, env = "ZTOQ_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Output structured JSON stats instead of a human summary.
    #[arg(long)]
    json: bool,

    /// Disable the directory-mode progress bar.
    #[arg(long, env = "ZTOQ_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ZTOQ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ZTOQ_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let is_dir = tokio::fs::metadata(&cli.input)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let show_progress = is_dir && !cli.quiet && !cli.no_progress && !cli.json;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    if config.base_url.is_empty() {
        warn!("No --base-url set; root-relative image paths are left as they are");
    }

    // ── Directory mode ───────────────────────────────────────────────────
    if is_dir {
        if cli.watch {
            anyhow::bail!("--watch takes a single file, not a directory");
        }
        let output_dir = cli
            .output
            .as_ref()
            .context("An output directory is required when the input is a directory")?;
        let batch = convert_dir(&cli.input, output_dir, &config)
            .await
            .context("Conversion failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&batch).context("Failed to serialise output")?
            );
        } else if !cli.quiet && !show_progress {
            eprintln!(
                "Converted {}/{} files in {}ms",
                batch.converted,
                batch.files.len(),
                batch.duration_ms
            );
        }
        batch.into_result().context("Some files failed")?;
        return Ok(());
    }

    // ── Watch mode ───────────────────────────────────────────────────────
    if cli.watch {
        let output = cli
            .output
            .as_ref()
            .context("--watch needs an output path")?;
        let summary = watch(&cli.input, output, &config, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Failed to start watching")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialise output")?
            );
        }
        return Ok(());
    }

    // ── Single file ──────────────────────────────────────────────────────
    if let Some(ref output) = cli.output {
        let stats = convert_to_file(&cli.input, output, &config)
            .await
            .context("Conversion failed")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&stats).context("Failed to serialise output")?
            );
        } else if !cli.quiet {
            let target = stats
                .output
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            eprintln!(
                "{}  {} images, {} callouts, {} details  {}ms  →  {}",
                green("✔"),
                stats.counts.images,
                stats.counts.callouts,
                stats.counts.details,
                stats.duration_ms,
                bold(&target),
            );
        }
    } else {
        let output = convert_file(&cli.input, &config)
            .await
            .context("Conversion failed")?;
        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.markdown.as_bytes())
                .context("Failed to write to stdout")?;
            handle.flush().context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .base_url(cli.base_url.clone())
        .concurrency(cli.concurrency)
        .poll_interval_ms(cli.poll_interval);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}
