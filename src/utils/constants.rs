//! Shared configuration constants for sitebot
//!
//! Defaults shared by the config builder, the environment loader and the
//! pipeline.

/// Maximum number of distinct pages visited by one crawl run.
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Number of crawled pages (besides the home page) fed to extraction.
pub const DEFAULT_MAX_TARGET_PAGES: usize = 3;

/// Words per chunk window
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Words shared by consecutive chunk windows
pub const DEFAULT_CHUNK_OVERLAP: usize = 40;

/// Per-page fetch timeout: 45 seconds
///
/// Covers browser launch, navigation and the settle delay.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 45;

/// Overall deadline for one run: 120 seconds
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

/// Concurrent renderer sessions per run; each one is a browser process.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 3;

/// Upper bound accepted for `max_concurrent_fetches`
pub const MAX_CONCURRENT_FETCHES_LIMIT: usize = 8;

/// Lower bound of the randomized settle delay before capturing markup
pub const DEFAULT_SETTLE_MIN_MS: u64 = 2_000;

/// Upper bound of the randomized settle delay before capturing markup
pub const DEFAULT_SETTLE_MAX_MS: u64 = 4_000;

/// Chunks retrieved as generative context
pub const DEFAULT_RETRIEVAL_TOP_K: usize = 3;

pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Characters of normalized text used for the heuristic "About Us" field
pub const ABOUT_US_MAX_CHARS: usize = 600;

/// Characters of normalized text used when no meta description exists
pub const DESCRIPTION_MAX_CHARS: usize = 400;

/// Chrome user agent string for stealth mode
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
