pub mod browser_setup;
pub mod config;
pub mod content;
pub mod crawl_engine;
pub mod extraction;
pub mod jobs;
pub mod llm;
pub mod retrieval;
pub mod server;
pub mod utils;

pub use browser_setup::{LaunchOptions, download_managed_browser, find_browser_executable, launch_browser};
pub use config::{ConfigError, SiteBotConfig, SiteBotConfigBuilder};
pub use content::{Chunk, ChunkError, NormalizedDocument, chunk_document, chunk_text, normalize};
pub use crawl_engine::{
    ChromiumRenderer, CrawlState, FetchStatus, NoOpProgress, PageFetchResult, PageRenderer,
    PipelineStage, ProgressReporter, ScrapeError, ScrapeResult, SiteScraper,
};
pub use extraction::{
    ExtractionEngine, ExtractionRecord, GenerativeExtractor, HeuristicExtractor, merge,
};
pub use jobs::{TaskManager, TaskPoll};
pub use llm::{Embedder, LanguageModel, LlmError, OpenAiChatModel, OpenAiClient, OpenAiEmbedder};
pub use retrieval::{RetrievalError, RetrievalIndex};
pub use server::{AppState, build_router};

/// Scraper wired from config: Chromium rendering, heuristic extraction, and
/// generative extraction backed by a retrieval index when API keys are set
///
/// # Errors
///
/// Returns `ScrapeError::Config` when a model client cannot be built.
pub fn build_scraper(config: SiteBotConfig) -> ScrapeResult<SiteScraper> {
    SiteScraper::from_config(config, None)
}

/// One-shot scrape of `site_url`
///
/// # Errors
///
/// See [`SiteScraper::scrape`].
pub async fn scrape_website(site_url: &str, config: SiteBotConfig) -> ScrapeResult<ExtractionRecord> {
    build_scraper(config)?.scrape(site_url).await
}
