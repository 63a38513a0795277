//! Crawl Engine Module
//!
//! Frontier management, page rendering and the run orchestrator that turns
//! a site URL into a reconciled business record.

pub mod cleanup;
pub mod crawl_types;
pub mod frontier;
pub mod link_processor;
pub mod orchestrator;
pub mod page_timeout;
pub mod progress;
pub mod renderer;

pub use crawl_types::{FailureKind, FetchStatus, PageFetchResult, ScrapeError, ScrapeResult};
pub use frontier::CrawlState;
pub use link_processor::{extract_links, process_page_links};
pub use orchestrator::{SiteScraper, select_targets};
pub use progress::{NoOpProgress, PipelineStage, ProgressReporter};
pub use renderer::{BrowserSession, ChromiumRenderer, PageRenderer};
