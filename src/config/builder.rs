//! Fluent builder for `SiteBotConfig`
//!
//! Every field has a default, so the builder has no required state. All
//! cross-field validation happens once in [`SiteBotConfigBuilder::build`].

use std::time::Duration;

use crate::utils::MAX_CONCURRENT_FETCHES_LIMIT;

use super::types::{ConfigError, SiteBotConfig};

#[derive(Debug, Clone, Default)]
pub struct SiteBotConfigBuilder {
    pub(crate) inner: SiteBotConfig,
}

impl SiteBotConfig {
    /// Create a builder for configuring a `SiteBotConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> SiteBotConfigBuilder {
        SiteBotConfigBuilder::default()
    }
}

impl SiteBotConfigBuilder {
    #[must_use]
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.inner.openai_api_key = non_empty(key.into());
        self
    }

    #[must_use]
    pub fn embedding_api_key(mut self, key: impl Into<String>) -> Self {
        self.inner.embedding_api_key = non_empty(key.into());
        self
    }

    /// Base URL of an OpenAI-compatible API, without a trailing slash
    #[must_use]
    pub fn openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.inner.openai_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn completion_model(mut self, model: impl Into<String>) -> Self {
        self.inner.completion_model = model.into();
        self
    }

    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.inner.embedding_model = model.into();
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.inner.proxy = non_empty(proxy.into());
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.inner.headless = headless;
        self
    }

    #[must_use]
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.inner.max_pages = max_pages;
        self
    }

    #[must_use]
    pub fn max_target_pages(mut self, max_target_pages: usize) -> Self {
        self.inner.max_target_pages = max_target_pages;
        self
    }

    #[must_use]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.inner.chunk_size = size;
        self
    }

    #[must_use]
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.inner.chunk_overlap = overlap;
        self
    }

    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.inner.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.inner.run_timeout = timeout;
        self
    }

    /// Set the number of renderer sessions a single run may hold at once
    ///
    /// Valid range is 1-8; `build()` rejects anything outside it.
    #[must_use]
    pub fn max_concurrent_fetches(mut self, n: usize) -> Self {
        self.inner.max_concurrent_fetches = n;
        self
    }

    /// Set the randomized settle delay range applied after navigation
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_sitebot::config::SiteBotConfig;
    /// # use std::time::Duration;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = SiteBotConfig::builder()
    ///     .settle_range(Duration::ZERO, Duration::from_millis(500))
    ///     .build()?;
    /// assert_eq!(config.settle_range().1, Duration::from_millis(500));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn settle_range(mut self, min: Duration, max: Duration) -> Self {
        self.inner.settle_min = min;
        self.inner.settle_max = max;
        self
    }

    #[must_use]
    pub fn retrieval_top_k(mut self, k: usize) -> Self {
        self.inner.retrieval_top_k = k;
        self
    }

    #[must_use]
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.inner.bind_addr = addr.into();
        self
    }

    /// Validate and produce the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when chunking parameters are inconsistent, when a
    /// numeric field is outside its allowed range, or when the settle range
    /// is inverted.
    pub fn build(self) -> Result<SiteBotConfig, ConfigError> {
        let config = self.inner;

        if config.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                size: config.chunk_size,
                overlap: config.chunk_overlap,
            });
        }

        check_range("max_pages", config.max_pages as u64, 1, 1_000)?;
        check_range("max_target_pages", config.max_target_pages as u64, 1, 100)?;
        check_range(
            "max_concurrent_fetches",
            config.max_concurrent_fetches as u64,
            1,
            MAX_CONCURRENT_FETCHES_LIMIT as u64,
        )?;
        check_range("retrieval_top_k", config.retrieval_top_k as u64, 1, 50)?;
        check_range(
            "fetch_timeout_ms",
            config.fetch_timeout.as_millis() as u64,
            1,
            u64::MAX,
        )?;
        check_range(
            "run_timeout_ms",
            config.run_timeout.as_millis() as u64,
            1,
            u64::MAX,
        )?;

        if config.settle_min > config.settle_max {
            return Err(ConfigError::SettleRange {
                min_ms: config.settle_min.as_millis() as u64,
                max_ms: config.settle_max.as_millis() as u64,
            });
        }

        // Headed mode is a development aid only
        #[cfg(not(debug_assertions))]
        let config = if config.headless {
            config
        } else {
            tracing::warn!(
                "Forcing headless mode in release build. \
                Headed mode is only available in debug builds for development."
            );
            SiteBotConfig {
                headless: true,
                ..config
            }
        };

        Ok(config)
    }
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
