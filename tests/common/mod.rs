//! Test doubles and fixtures shared by the sitebot integration tests

use async_trait::async_trait;
use kodegen_tools_sitebot::crawl_engine::{FetchStatus, PageFetchResult, PageRenderer, SiteScraper};
use kodegen_tools_sitebot::extraction::{ExtractionEngine, GenerativeExtractor};
use kodegen_tools_sitebot::llm::{Embedder, LanguageModel, LlmError};
use kodegen_tools_sitebot::{RetrievalIndex, SiteBotConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

fn lookup_key(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Serves canned markup by URL and records every fetch
#[allow(dead_code)]
#[derive(Default)]
pub struct StaticRenderer {
    pages: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, markup: impl Into<String>) -> Self {
        self.pages.insert(lookup_key(url), markup.into());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    async fn fetch(&self, url: &Url, _timeout: Duration) -> PageFetchResult {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(&lookup_key(url.as_str())) {
            Some(markup) => PageFetchResult::ok(url.as_str(), markup.clone()),
            None => PageFetchResult::failed(url.as_str(), FetchStatus::Error),
        }
    }
}

/// Never finishes a fetch within any reasonable deadline
#[allow(dead_code)]
pub struct SlowRenderer {
    pub delay: Duration,
}

#[async_trait]
impl PageRenderer for SlowRenderer {
    async fn fetch(&self, url: &Url, _timeout: Duration) -> PageFetchResult {
        tokio::time::sleep(self.delay).await;
        PageFetchResult::ok(url.as_str(), "<p>late</p>".to_string())
    }
}

/// Tracks how many fetches are live at once; a fetch stops counting as live
/// when it completes or its future is dropped
#[allow(dead_code)]
pub struct CountingRenderer {
    pages: StaticRenderer,
    delay: Duration,
    live: Arc<AtomicUsize>,
    peak: AtomicUsize,
}

struct LiveFetch(Arc<AtomicUsize>);

impl Drop for LiveFetch {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[allow(dead_code)]
impl CountingRenderer {
    pub fn new(pages: StaticRenderer, delay: Duration) -> Self {
        Self {
            pages,
            delay,
            live: Arc::new(AtomicUsize::new(0)),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.pages.fetched()
    }
}

#[async_trait]
impl PageRenderer for CountingRenderer {
    async fn fetch(&self, url: &Url, timeout: Duration) -> PageFetchResult {
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        let _live = LiveFetch(self.live.clone());
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.pages.fetch(url, timeout).await
    }
}

/// Returns a fixed completion and keeps the prompts it was given
#[allow(dead_code)]
pub struct ScriptedModel {
    reply: Result<String, LlmError>,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(LlmError::Network("connection refused".to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

/// Places the retrieval query and anything mentioning Oakland on one axis,
/// all other text on the other
#[allow(dead_code)]
pub struct LocationEmbedder;

#[async_trait]
impl Embedder for LocationEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                if t.contains("oakland") || t.contains("structured") {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect())
    }
}

#[allow(dead_code)]
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Err(LlmError::Api("embeddings unavailable".to_string()))
    }
}

/// Fast, deterministic config: no settle delay, small timeouts
#[allow(dead_code)]
pub fn test_config() -> SiteBotConfig {
    test_config_with(|b| b)
}

#[allow(dead_code)]
pub fn test_config_with(
    customize: impl FnOnce(
        kodegen_tools_sitebot::SiteBotConfigBuilder,
    ) -> kodegen_tools_sitebot::SiteBotConfigBuilder,
) -> SiteBotConfig {
    let builder = SiteBotConfig::builder()
        .settle_range(Duration::ZERO, Duration::ZERO)
        .fetch_timeout(Duration::from_secs(5))
        .run_timeout(Duration::from_secs(10));
    customize(builder).build().unwrap()
}

#[allow(dead_code)]
pub fn heuristic_scraper(config: SiteBotConfig, renderer: Arc<dyn PageRenderer>) -> SiteScraper {
    SiteScraper::new(
        Arc::new(config),
        renderer,
        Arc::new(ExtractionEngine::heuristic_only()),
    )
}

#[allow(dead_code)]
pub fn generative_scraper(
    config: SiteBotConfig,
    renderer: Arc<dyn PageRenderer>,
    model: Arc<ScriptedModel>,
    embedder: Option<Arc<dyn Embedder>>,
) -> SiteScraper {
    let mut generative = GenerativeExtractor::new(model, config.retrieval_top_k());
    if let Some(embedder) = embedder {
        generative = generative.with_index(Arc::new(RetrievalIndex::new(embedder)));
    }
    SiteScraper::new(
        Arc::new(config),
        renderer,
        Arc::new(ExtractionEngine::with_generative(generative)),
    )
}

/// Wraps body markup in a minimal document
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body>
    {body}
</body>
</html>"#
    )
}

#[allow(dead_code)]
pub const SITE: &str = "https://acme.test";

/// Home, about, services and contact pages for a small business site
#[allow(dead_code)]
pub fn acme_site() -> StaticRenderer {
    let nav = r#"<nav>
        <a href="/">Home</a>
        <a href="/about">About</a>
        <a href="/services">Services</a>
        <a href="/contact">Contact</a>
    </nav>"#;

    StaticRenderer::new()
        .page(
            SITE,
            create_test_html(
                "Acme Rockets",
                &format!(
                    r#"{nav}
    <main><h1>Acme Rockets</h1><p>Reusable launch vehicles for small payloads.</p></main>
    <footer>
        <a href="https://www.facebook.com/acmerockets">Facebook</a>
        <a href="https://x.com/acmerockets">X</a>
    </footer>"#
                ),
            ),
        )
        .page(
            "https://acme.test/about",
            create_test_html(
                "About Acme",
                &format!(
                    r#"{nav}
    <main><h1>About us</h1><p>Acme has built rockets in Oakland since 1999.</p></main>"#
                ),
            ),
        )
        .page(
            "https://acme.test/services",
            create_test_html(
                "Services",
                &format!(
                    r#"{nav}
    <main><h1>Services</h1><ul><li>Orbital launch</li><li>Payload integration</li></ul></main>"#
                ),
            ),
        )
        .page(
            "https://acme.test/contact",
            create_test_html(
                "Contact",
                &format!(
                    r#"{nav}
    <main>
        <h1>Contact</h1>
        <p>Call us at +1-415-555-0100 or email hello@acme.com</p>
        <address>1200 Harbor Way, Oakland, CA 94607</address>
    </main>"#
                ),
            ),
        )
}

/// Home page linking to `count` leaf pages
#[allow(dead_code)]
pub fn wide_site(count: usize) -> StaticRenderer {
    let links: String = (1..=count)
        .map(|i| format!(r#"<a href="/page-{i}">Page {i}</a>"#))
        .collect();
    let mut site = StaticRenderer::new().page(
        SITE,
        create_test_html("Wide", &format!("<nav>{links}</nav><main><p>Hub page.</p></main>")),
    );
    for i in 1..=count {
        site = site.page(
            &format!("{SITE}/page-{i}"),
            create_test_html(&format!("Page {i}"), &format!("<main><p>Leaf number {i}.</p></main>")),
        );
    }
    site
}

/// Three pages, no contact details anywhere
#[allow(dead_code)]
pub fn quiet_site() -> StaticRenderer {
    let nav = r#"<nav><a href="/">Home</a><a href="/history">History</a><a href="/team">Team</a></nav>"#;
    StaticRenderer::new()
        .page(
            SITE,
            create_test_html("Quiet Co", &format!("{nav}<main><p>We make quiet things.</p></main>")),
        )
        .page(
            "https://acme.test/history",
            create_test_html("History", &format!("{nav}<main><p>Founded long ago.</p></main>")),
        )
        .page(
            "https://acme.test/team",
            create_test_html("Team", &format!("{nav}<main><p>A small team of makers.</p></main>")),
        )
}
