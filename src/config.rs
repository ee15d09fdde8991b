//! Configuration types for Zenn-to-Qiita conversion.
//!
//! All behaviour outside the fixed rewrite rules is controlled through
//! [`ConversionConfig`], built via its [`ConversionConfigBuilder`]. The core
//! rules only need the base URL; the remaining fields configure the file,
//! batch and watch layers.

use crate::error::ZtoqError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Configuration for a Zenn-to-Qiita conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use ztoq::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .base_url("https://raw.githubusercontent.com/owner/repo/main/")
///     .concurrency(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "https://raw.githubusercontent.com/owner/repo/main");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// URL prepended to root-relative image paths (`/images/a.png`). Default: empty.
    ///
    /// Zenn resolves image paths against the article repository; Qiita needs
    /// an absolute URL, usually the raw-content URL of that repository
    /// (`https://raw.githubusercontent.com/<owner>/<repo>/<branch>`). When
    /// empty, paths keep their root-relative form and only the size suffix is
    /// removed. A trailing `/` is dropped by [`ConversionConfigBuilder::build`].
    pub base_url: String,

    /// Files converted at once by [`crate::convert::convert_dir`]. Default: 8.
    pub concurrency: usize,

    /// Poll interval for [`crate::watch::watch`], in milliseconds. Default: 1000.
    ///
    /// The watcher polls rather than relying on OS notifications so that it
    /// behaves the same on network mounts and inside containers.
    pub poll_interval_ms: u64,

    /// Per-file events during a directory batch. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            concurrency: 8,
            poll_interval_ms: 1000,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("base_url", &self.base_url)
            .field("concurrency", &self.concurrency)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ConversionConfig, ZtoqError> {
        let base = self.config.base_url.trim().trim_end_matches('/').to_string();
        if !base.is_empty() && !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ZtoqError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.config.base_url
            )));
        }
        self.config.base_url = base;

        if self.config.concurrency == 0 {
            return Err(ZtoqError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if self.config.poll_interval_ms < 10 {
            return Err(ZtoqError::InvalidConfig(format!(
                "Poll interval must be ≥ 10ms, got {}ms",
                self.config.poll_interval_ms
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgressCallback;
    use std::sync::Arc;

    #[test]
    fn default_config_builds() {
        let c = ConversionConfig::builder().build().unwrap();
        assert_eq!(c.base_url, "");
        assert_eq!(c.concurrency, 8);
        assert_eq!(c.poll_interval_ms, 1000);
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn base_url_is_trimmed() {
        let c = ConversionConfig::builder()
            .base_url("  https://raw.githubusercontent.com/o/r/main//  ")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "https://raw.githubusercontent.com/o/r/main");
    }

    #[test]
    fn base_url_without_scheme_is_rejected() {
        let err = ConversionConfig::builder()
            .base_url("raw.githubusercontent.com/o/r")
            .build()
            .unwrap_err();
        assert!(matches!(err, ZtoqError::InvalidConfig(_)));
        assert!(err.to_string().contains("http://"), "got: {err}");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = ConversionConfig::builder().concurrency(0).build().unwrap_err();
        assert!(err.to_string().contains("Concurrency"), "got: {err}");
    }

    #[test]
    fn tiny_poll_interval_is_rejected() {
        assert!(ConversionConfig::builder().poll_interval_ms(5).build().is_err());
        assert!(ConversionConfig::builder().poll_interval_ms(10).build().is_ok());
    }

    #[test]
    fn debug_hides_callback() {
        let c = ConversionConfig::builder()
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn ConversionProgressCallback>"), "got: {dbg}");
    }
}
