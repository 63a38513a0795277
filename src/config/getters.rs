//! Getter methods for `SiteBotConfig`

use std::time::Duration;

use super::types::SiteBotConfig;

impl SiteBotConfig {
    #[must_use]
    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }

    /// Embedding credential, falling back to the completion credential
    #[must_use]
    pub fn embedding_api_key(&self) -> Option<&str> {
        self.embedding_api_key
            .as_deref()
            .or(self.openai_api_key.as_deref())
    }

    #[must_use]
    pub fn openai_base_url(&self) -> &str {
        &self.openai_base_url
    }

    #[must_use]
    pub fn completion_model(&self) -> &str {
        &self.completion_model
    }

    #[must_use]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    #[must_use]
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    #[must_use]
    pub fn max_target_pages(&self) -> usize {
        self.max_target_pages
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    #[must_use]
    pub fn run_timeout(&self) -> Duration {
        self.run_timeout
    }

    #[must_use]
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }

    /// Inclusive range of the randomized settle delay
    #[must_use]
    pub fn settle_range(&self) -> (Duration, Duration) {
        (self.settle_min, self.settle_max)
    }

    #[must_use]
    pub fn retrieval_top_k(&self) -> usize {
        self.retrieval_top_k
    }

    #[must_use]
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Whether the generative extractor can be constructed
    #[must_use]
    pub fn generative_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }
}
