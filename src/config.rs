//! Configuration for provider access and generation behaviour.
//!
//! Everything that used to live in ambient process state in similar tools —
//! API key lookup, the shared HTTP client, per-feature tuning constants —
//! is collected in one [`ForgeConfig`] built once at process start and
//! passed by reference to every component that issues provider calls.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::error::ForgeError;
use std::fmt;
use std::time::Duration;

/// Default chat-completions endpoint base.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model when none is named per call.
pub const DEFAULT_MODEL: &str = "gpt-oss-120b";

/// Configuration for all studyforge operations.
///
/// Built via [`ForgeConfig::builder()`] or [`ForgeConfig::from_env()`].
///
/// # Example
/// ```rust
/// use studyforge::ForgeConfig;
///
/// let config = ForgeConfig::builder()
///     .api_key("sk-...")
///     .model("gpt-4o")
///     .max_attempts(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ForgeConfig {
    /// Provider API key, sent as a bearer token.
    pub api_key: String,

    /// Chat-completions base URL (no trailing slash). Default:
    /// [`DEFAULT_BASE_URL`]. Point this at any OpenAI-compatible endpoint
    /// (Ollama, vLLM, LiteLLM, ...).
    pub base_url: String,

    /// Model identifier used when a call does not name one. Default:
    /// [`DEFAULT_MODEL`].
    pub model: String,

    /// Attempt ceiling for rate-limited requests. Default: 10.
    ///
    /// Attempt 1 is the initial request; only HTTP 429 responses consume
    /// further attempts. The final rate-limit error propagates unchanged.
    pub max_attempts: u32,

    /// Lower bound of the randomized backoff wait. Default: 30 s.
    pub backoff_min: Duration,

    /// Upper bound of the randomized backoff wait. Default: 60 s.
    ///
    /// Waits double per attempt from `backoff_min` and are clamped into
    /// `[backoff_min, backoff_max]`, with uniform jitter inside the window
    /// so concurrent workers don't retry in lockstep.
    pub backoff_max: Duration,

    /// Per-request timeout applied by the HTTP client. Default: 300 s.
    ///
    /// Generation calls routinely run for minutes on large prompts; this is
    /// a hang guard, not a latency target.
    pub api_timeout: Duration,

    /// Worker-pool width for batch flashcard generation. Default: 0,
    /// meaning `std::thread::available_parallelism()`.
    pub concurrency: usize,

    /// Application-level hard cap on requested output tokens. Default: 48 000.
    pub output_token_cap: usize,

    /// Maximum visible-page gap one interpolation segment may bridge.
    /// Default: 100. Larger gaps are skipped (left unmapped) with a warning.
    pub interpolation_max_gap: u32,

    /// How many leading pages to scan for a table of contents. Default: 10.
    pub toc_scan_pages: usize,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_attempts: 10,
            backoff_min: Duration::from_secs(30),
            backoff_max: Duration::from_secs(60),
            api_timeout: Duration::from_secs(300),
            concurrency: 0,
            output_token_cap: 48_000,
            interpolation_max_gap: 100,
            toc_scan_pages: 10,
        }
    }
}

impl fmt::Debug for ForgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForgeConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_min", &self.backoff_min)
            .field("backoff_max", &self.backoff_max)
            .field("api_timeout", &self.api_timeout)
            .field("concurrency", &self.concurrency)
            .field("output_token_cap", &self.output_token_cap)
            .field("interpolation_max_gap", &self.interpolation_max_gap)
            .field("toc_scan_pages", &self.toc_scan_pages)
            .finish()
    }
}

impl ForgeConfig {
    /// Create a new builder.
    pub fn builder() -> ForgeConfigBuilder {
        ForgeConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from the environment.
    ///
    /// Reads `STUDYFORGE_API_KEY` (falling back to `OPENAI_API_KEY`),
    /// `STUDYFORGE_BASE_URL`, and `STUDYFORGE_MODEL`. Everything else keeps
    /// its default; use [`ForgeConfig::builder()`] for full control.
    pub fn from_env() -> Result<Self, ForgeError> {
        let api_key = std::env::var("STUDYFORGE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| {
                ForgeError::InvalidConfig(
                    "no API key: set STUDYFORGE_API_KEY or OPENAI_API_KEY".into(),
                )
            })?;

        let mut builder = Self::builder().api_key(api_key);
        if let Ok(url) = std::env::var("STUDYFORGE_BASE_URL") {
            if !url.is_empty() {
                builder = builder.base_url(url);
            }
        }
        if let Ok(model) = std::env::var("STUDYFORGE_MODEL") {
            if !model.is_empty() {
                builder = builder.model(model);
            }
        }
        builder.build()
    }

    /// Effective flashcard worker-pool width.
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency > 0 {
            self.concurrency
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }
}

/// Builder for [`ForgeConfig`].
#[derive(Debug)]
pub struct ForgeConfigBuilder {
    config: ForgeConfig,
}

impl ForgeConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n.max(1);
        self
    }

    pub fn backoff_window(mut self, min: Duration, max: Duration) -> Self {
        self.config.backoff_min = min;
        self.config.backoff_max = max;
        self
    }

    pub fn api_timeout(mut self, timeout: Duration) -> Self {
        self.config.api_timeout = timeout;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn output_token_cap(mut self, cap: usize) -> Self {
        self.config.output_token_cap = cap;
        self
    }

    pub fn interpolation_max_gap(mut self, gap: u32) -> Self {
        self.config.interpolation_max_gap = gap;
        self
    }

    pub fn toc_scan_pages(mut self, pages: usize) -> Self {
        self.config.toc_scan_pages = pages;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ForgeConfig, ForgeError> {
        let c = &self.config;
        if c.api_key.trim().is_empty() {
            return Err(ForgeError::InvalidConfig("API key must not be empty".into()));
        }
        if c.base_url.is_empty() {
            return Err(ForgeError::InvalidConfig("base URL must not be empty".into()));
        }
        if c.backoff_max < c.backoff_min {
            return Err(ForgeError::InvalidConfig(format!(
                "backoff window is inverted: min {:?} > max {:?}",
                c.backoff_min, c.backoff_max
            )));
        }
        if c.output_token_cap == 0 {
            return Err(ForgeError::InvalidConfig(
                "output token cap must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ForgeConfig::builder().api_key("k").build().unwrap();
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.max_attempts, 10);
        assert_eq!(c.backoff_min, Duration::from_secs(30));
        assert_eq!(c.backoff_max, Duration::from_secs(60));
        assert_eq!(c.output_token_cap, 48_000);
        assert_eq!(c.interpolation_max_gap, 100);
        assert_eq!(c.toc_scan_pages, 10);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(ForgeConfig::builder().api_key("  ").build().is_err());
    }

    #[test]
    fn inverted_backoff_window_is_rejected() {
        let r = ForgeConfig::builder()
            .api_key("k")
            .backoff_window(Duration::from_secs(10), Duration::from_secs(1))
            .build();
        assert!(r.is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = ForgeConfig::builder()
            .api_key("k")
            .base_url("http://localhost:11434/v1/")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn effective_concurrency_falls_back_to_cores() {
        let c = ForgeConfig::builder().api_key("k").build().unwrap();
        assert!(c.effective_concurrency() >= 1);
        let c = ForgeConfig::builder()
            .api_key("k")
            .concurrency(3)
            .build()
            .unwrap();
        assert_eq!(c.effective_concurrency(), 3);
    }
}
