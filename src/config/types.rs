//! Core configuration type for scrape runs
//!
//! `SiteBotConfig` holds everything a run needs that is not the site URL
//! itself: crawl budget, chunking, timeouts, concurrency and the credentials
//! for the optional generative path. It is built once per process (usually
//! from the environment) and shared by every run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::{
    DEFAULT_BIND_ADDR, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_COMPLETION_MODEL,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_FETCHES,
    DEFAULT_MAX_PAGES, DEFAULT_MAX_TARGET_PAGES, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_RETRIEVAL_TOP_K, DEFAULT_RUN_TIMEOUT_SECS, DEFAULT_SETTLE_MAX_MS,
    DEFAULT_SETTLE_MIN_MS,
};

/// Main configuration struct for scrape runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteBotConfig {
    /// Credential for the chat completion API.
    ///
    /// When absent the generative extractor is not constructed and every run
    /// returns the heuristic record.
    #[serde(skip_serializing)]
    pub(crate) openai_api_key: Option<String>,

    /// Credential for the embedding API (retrieval index).
    ///
    /// When absent the generative extractor uses the first chunks verbatim.
    #[serde(skip_serializing)]
    pub(crate) embedding_api_key: Option<String>,

    pub(crate) openai_base_url: String,
    pub(crate) completion_model: String,
    pub(crate) embedding_model: String,

    /// Outbound proxy used by the browser and the API clients
    pub(crate) proxy: Option<String>,

    pub(crate) headless: bool,

    /// Distinct normalized URLs visited by the frontier, failed fetches included
    pub(crate) max_pages: usize,

    /// Keyword-matched pages (about/contact/service) used for extraction
    pub(crate) max_target_pages: usize,

    pub(crate) chunk_size: usize,
    pub(crate) chunk_overlap: usize,

    /// Timeout for one page fetch: browser launch, navigation and settle
    pub(crate) fetch_timeout: Duration,

    /// Deadline for the whole run; exceeding it cancels outstanding fetches
    pub(crate) run_timeout: Duration,

    /// Concurrent renderer sessions within one run
    /// Default: 3, Range: 1-8
    pub(crate) max_concurrent_fetches: usize,

    /// Randomized delay before capturing markup, letting lazy content settle
    pub(crate) settle_min: Duration,
    pub(crate) settle_max: Duration,

    pub(crate) retrieval_top_k: usize,

    /// Socket address for the HTTP surface
    pub(crate) bind_addr: String,
}

impl Default for SiteBotConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            embedding_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            proxy: None,
            headless: true,
            max_pages: DEFAULT_MAX_PAGES,
            max_target_pages: DEFAULT_MAX_TARGET_PAGES,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            run_timeout: Duration::from_secs(DEFAULT_RUN_TIMEOUT_SECS),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            settle_min: Duration::from_millis(DEFAULT_SETTLE_MIN_MS),
            settle_max: Duration::from_millis(DEFAULT_SETTLE_MAX_MS),
            retrieval_top_k: DEFAULT_RETRIEVAL_TOP_K,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// Errors raised while building or loading a configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },

    #[error("{field} is out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("settle delay minimum ({min_ms} ms) exceeds maximum ({max_ms} ms)")]
    SettleRange { min_ms: u64, max_ms: u64 },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },
}
