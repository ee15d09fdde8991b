//! # ztoq
//!
//! Convert Zenn-flavoured Markdown to Qiita-flavoured Markdown.
//!
//! Both platforms speak ordinary CommonMark, but each has its own extensions.
//! This crate rewrites the Zenn ones into their Qiita equivalents and leaves
//! everything else byte-for-byte intact, including anything that merely
//! looks like an extension inside a fenced code block.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Zenn markdown
//!  │
//!  ├─ 1. Fence   split into fenced (verbatim) and prose spans
//!  ├─ 2. Images  drop `=WxH`, prefix `/images/…` with the base URL
//!  ├─ 3. Callout `:::message` → `:::note`
//!  ├─ 4. Details `:::details T … :::` → `<details><summary>T</summary> … </details>`
//!  └─ 5. Output  spans reassembled in order
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! let zenn = ":::details Setup\nRun `make`.\n:::\n![diagram](/images/flow.png =400x)\n";
//! let qiita = ztoq::convert(zenn, "https://raw.githubusercontent.com/me/blog/main");
//! assert_eq!(
//!     qiita,
//!     "<details><summary>Setup</summary>\n\nRun `make`.\n</details>\n\
//!      ![diagram](https://raw.githubusercontent.com/me/blog/main/images/flow.png)\n"
//! );
//! ```
//!
//! File, directory and watch helpers live in [`convert`](mod@convert) and
//! [`watch`](mod@watch); they are async and run on tokio.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ztoq` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ztoq = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod watch;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    convert, convert_dir, convert_file, convert_to_file, convert_with_config, resolve_output_path,
};
pub use error::{FileError, ZtoqError};
pub use output::{
    BatchOutput, ConversionOutput, ConversionStats, FileResult, RewriteCounts, WatchSummary,
};
pub use pipeline::{Pipeline, RewriteRule, Span, SpanKind};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use watch::watch;
