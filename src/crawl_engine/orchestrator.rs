//! Scrape run orchestration
//!
//! One run: frontier and concurrent rendering, target page selection,
//! normalization, chunking, extraction and reconciliation, all under the
//! run deadline. Fetches are polled in this task rather than spawned, so
//! when the deadline fires every in-flight fetch future is dropped and its
//! browser session torn down.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use super::crawl_types::{PageFetchResult, ScrapeError, ScrapeResult};
use super::frontier::CrawlState;
use super::link_processor::process_page_links;
use super::progress::{NoOpProgress, PipelineStage, ProgressReporter};
use super::renderer::{ChromiumRenderer, PageRenderer};
use crate::config::SiteBotConfig;
use crate::content::{chunk_document, normalize, NormalizedDocument};
use crate::extraction::{merge, ExtractionEngine, ExtractionInput, ExtractionRecord};
use crate::retrieval::RetrievalIndex;
use crate::utils::{normalize_site_url, url_key};

/// Path keywords that mark a page as worth extracting from
const TARGET_KEYWORDS: &[&str] = &["about", "contact", "service"];

/// Entry point for scrape runs; cheap to clone and share across tasks
#[derive(Clone)]
pub struct SiteScraper {
    config: Arc<SiteBotConfig>,
    renderer: Arc<dyn PageRenderer>,
    engine: Arc<ExtractionEngine>,
}

impl std::fmt::Debug for SiteScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteScraper")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl SiteScraper {
    #[must_use]
    pub fn new(
        config: Arc<SiteBotConfig>,
        renderer: Arc<dyn PageRenderer>,
        engine: Arc<ExtractionEngine>,
    ) -> Self {
        Self {
            config,
            renderer,
            engine,
        }
    }

    /// Chromium renderer plus whichever extraction backends the config enables
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::Config` when a model client cannot be built.
    pub fn from_config(
        config: SiteBotConfig,
        index: Option<Arc<RetrievalIndex>>,
    ) -> ScrapeResult<Self> {
        let engine = ExtractionEngine::from_config(&config, index)
            .map_err(|e| ScrapeError::Extraction(e.to_string()))?;
        let renderer = ChromiumRenderer::from_config(&config);
        Ok(Self::new(Arc::new(config), Arc::new(renderer), Arc::new(engine)))
    }

    #[must_use]
    pub fn config(&self) -> &SiteBotConfig {
        &self.config
    }

    /// Scrape a site into a business record
    ///
    /// # Errors
    ///
    /// `InvalidUrl` for an unusable site URL, `NoContent` when no page
    /// yielded text, `Timeout` when the run deadline passes.
    pub async fn scrape(&self, site_url: &str) -> ScrapeResult<ExtractionRecord> {
        self.scrape_with_progress(site_url, &NoOpProgress).await
    }

    /// Same as [`SiteScraper::scrape`], reporting each stage transition
    ///
    /// # Errors
    ///
    /// See [`SiteScraper::scrape`].
    pub async fn scrape_with_progress(
        &self,
        site_url: &str,
        progress: &dyn ProgressReporter,
    ) -> ScrapeResult<ExtractionRecord> {
        let site_url = normalize_site_url(site_url);
        let started = Instant::now();
        enter(progress, PipelineStage::Idle);

        let result = match tokio::time::timeout(
            self.config.run_timeout(),
            self.run(&site_url, progress),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::Timeout {
                url: site_url.clone(),
                elapsed: started.elapsed(),
            }),
        };

        match &result {
            Ok(_) => enter(progress, PipelineStage::Done),
            Err(e) => {
                error!(target: "sitebot::crawl", "Scrape of {site_url} failed: {e}");
                enter(progress, PipelineStage::Failed(e.to_string()));
            }
        }
        result
    }

    async fn run(
        &self,
        site_url: &str,
        progress: &dyn ProgressReporter,
    ) -> ScrapeResult<ExtractionRecord> {
        let started = Instant::now();
        let config = &self.config;

        let mut state = CrawlState::initialize(site_url, config.max_pages())?;
        let seed_key = url_key(state.seed());
        enter(progress, PipelineStage::Crawling);

        let fetched = self.crawl(&mut state, progress).await;
        let attempted = fetched.len();
        let ok_pages: Vec<PageFetchResult> = fetched.into_iter().filter(PageFetchResult::is_ok).collect();
        if ok_pages.is_empty() {
            return Err(ScrapeError::NoContent {
                url: site_url.to_string(),
                attempted,
            });
        }

        enter(progress, PipelineStage::Normalizing);
        let targets = select_targets(&ok_pages, &seed_key, config.max_target_pages());
        let pages: Vec<NormalizedDocument> = targets
            .into_iter()
            .map(|page| NormalizedDocument {
                url: page.url.clone(),
                plain_text: normalize(&page.raw_markup),
                markup: page.raw_markup.clone(),
            })
            .collect();

        let aggregated_text = pages
            .iter()
            .map(|p| p.plain_text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if aggregated_text.is_empty() {
            return Err(ScrapeError::NoContent {
                url: site_url.to_string(),
                attempted,
            });
        }

        let chunks = chunk_document(
            site_url,
            &aggregated_text,
            config.chunk_size(),
            config.chunk_overlap(),
        )?;
        debug!(
            target: "sitebot::crawl",
            "{} target page(s), {} chars, {} chunk(s)",
            pages.len(),
            aggregated_text.len(),
            chunks.len()
        );

        enter(progress, PipelineStage::Extracting);
        let input = ExtractionInput {
            site_url,
            aggregated_text: &aggregated_text,
            chunks: &chunks,
            pages: &pages,
        };
        let outcome = self.engine.run(&input).await;

        enter(progress, PipelineStage::Reconciling);
        let record = merge(outcome.heuristic, outcome.generative, site_url);

        info!(
            target: "sitebot::crawl",
            "Scraped {site_url}: {attempted} page(s) fetched, {} usable, {} used in {:.2}s",
            ok_pages.len(),
            pages.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(record)
    }

    /// Fetch pages until the frontier is exhausted; results in dequeue order
    async fn crawl(
        &self,
        state: &mut CrawlState,
        progress: &dyn ProgressReporter,
    ) -> Vec<PageFetchResult> {
        let concurrency = self.config.max_concurrent_fetches();
        let fetch_timeout = self.config.fetch_timeout();
        let mut in_flight = FuturesUnordered::new();
        let mut results: Vec<(usize, PageFetchResult)> = Vec::new();
        let mut dispatched = 0usize;

        loop {
            while in_flight.len() < concurrency {
                let Some(url) = state.next() else {
                    break;
                };
                if dispatched == 0 {
                    enter(progress, PipelineStage::Rendering);
                }
                let ordinal = dispatched;
                dispatched += 1;

                let renderer = Arc::clone(&self.renderer);
                in_flight.push(async move {
                    let result = renderer.fetch(&url, fetch_timeout).await;
                    (ordinal, url, result)
                });
            }

            let Some((ordinal, url, result)) = in_flight.next().await else {
                break;
            };

            progress.report_page_fetched(&result.url, result.is_ok());
            if result.is_ok() {
                process_page_links(state, &result.raw_markup, &page_base(&url, &result));
            } else {
                warn!(
                    target: "sitebot::crawl",
                    "Skipping {url}: fetch {}",
                    result.status
                );
            }
            results.push((ordinal, result));
        }

        results.sort_by_key(|(ordinal, _)| *ordinal);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

fn enter(progress: &dyn ProgressReporter, stage: PipelineStage) {
    debug!(target: "sitebot::crawl", "Stage: {stage}");
    progress.report_stage(&stage);
}

/// Base URL for resolving a page's relative links
fn page_base(requested: &Url, result: &PageFetchResult) -> Url {
    Url::parse(&result.url).unwrap_or_else(|_| requested.clone())
}

fn is_target_page(url: &str) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|_| url.to_ascii_lowercase());
    TARGET_KEYWORDS.iter().any(|k| path.contains(k))
}

/// Pages used for extraction
///
/// The seed page plus keyword pages (about/contact/service) in crawl order,
/// at most `max_target_pages + 1` in total. Without any keyword page, the
/// first `max_target_pages` fetched pages.
#[must_use]
pub fn select_targets<'a>(
    pages: &'a [PageFetchResult],
    seed_key: &str,
    max_target_pages: usize,
) -> Vec<&'a PageFetchResult> {
    let is_seed = |page: &PageFetchResult| {
        Url::parse(&page.url).is_ok_and(|u| url_key(&u) == seed_key)
    };

    let keyword_pages: Vec<&PageFetchResult> = pages
        .iter()
        .filter(|p| !is_seed(p) && is_target_page(&p.url))
        .take(max_target_pages)
        .collect();

    if keyword_pages.is_empty() {
        return pages.iter().take(max_target_pages).collect();
    }

    let mut selected: Vec<&PageFetchResult> = pages.iter().filter(|p| is_seed(p)).take(1).collect();
    selected.extend(keyword_pages);
    selected
}
