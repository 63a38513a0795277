//! Page rendering through a scoped headless-browser session
//!
//! `PageRenderer::fetch` never fails: navigation problems become a
//! `PageFetchResult` with an error or timeout status and empty markup.
//! `ChromiumRenderer` launches one browser per fetch and tears it down on
//! every exit path, including when the fetch future is dropped mid-flight.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, Page};
use log::{debug, warn};
use rand::Rng;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use url::Url;

use super::cleanup::{cleanup_browser_and_data, remove_profile_dir, CleanupResult};
use super::crawl_types::PageFetchResult;
use super::page_timeout::with_page_timeout;
use crate::browser_setup::{hide_automation, launch_browser, LaunchOptions};
use crate::config::SiteBotConfig;

const READY_STATE_POLL: Duration = Duration::from_millis(100);

/// Renders one URL into markup
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> PageFetchResult;
}

/// Renderer backed by a fresh Chromium process per fetch
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    launch: LaunchOptions,
    settle_min: Duration,
    settle_max: Duration,
}

impl ChromiumRenderer {
    #[must_use]
    pub fn new(launch: LaunchOptions, settle_min: Duration, settle_max: Duration) -> Self {
        Self {
            launch,
            settle_min,
            settle_max: settle_max.max(settle_min),
        }
    }

    #[must_use]
    pub fn from_config(config: &SiteBotConfig) -> Self {
        let (settle_min, settle_max) = config.settle_range();
        Self::new(
            LaunchOptions {
                headless: config.headless(),
                proxy: config.proxy().map(str::to_string),
                user_data_dir: None,
            },
            settle_min,
            settle_max,
        )
    }

    fn settle_delay(&self) -> Duration {
        if self.settle_max <= self.settle_min {
            return self.settle_min;
        }
        let min = self.settle_min.as_millis() as u64;
        let max = self.settle_max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn fetch(&self, url: &Url, timeout: Duration) -> PageFetchResult {
        let started = Instant::now();
        let settle = self.settle_delay();
        let mut slot: Option<BrowserSession> = None;

        let outcome = with_page_timeout(
            async {
                let session = slot.insert(BrowserSession::launch(&self.launch).await?);
                session.capture(url, settle).await
            },
            timeout,
            "Page fetch",
        )
        .await;

        if let Some(session) = slot.take() {
            session.release().await;
        }

        match outcome {
            Ok(markup) => {
                debug!(
                    target: "sitebot::crawl",
                    "Rendered {url} ({} bytes) in {:.2}s",
                    markup.len(),
                    started.elapsed().as_secs_f64()
                );
                PageFetchResult::ok(url.as_str(), markup)
            }
            Err(e) => {
                warn!(target: "sitebot::crawl", "Fetch failed for {url}: {e:#}");
                PageFetchResult::from_error(url.as_str(), &e)
            }
        }
    }
}

/// Scoped browser process, handler task and profile directory
///
/// Call [`BrowserSession::release`] for an orderly shutdown. If the session
/// is dropped instead (cancelled fetch), `Drop` hands the shutdown to the
/// runtime, or kills the process synchronously when no runtime is left.
pub struct BrowserSession {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserSession {
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let launched = launch_browser(options).await?;
        Ok(Self {
            browser: Some(launched.browser),
            handler: Some(launched.handler),
            user_data_dir: Some(launched.user_data_dir),
        })
    }

    /// Navigate, wait for the document to settle and return the rendered markup
    pub async fn capture(&self, url: &Url, settle: Duration) -> Result<String> {
        let browser = self
            .browser
            .as_ref()
            .context("browser session already released")?;

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser page")?;

        if let Err(e) = hide_automation(&page).await {
            debug!(target: "sitebot::crawl", "Automation overrides not installed: {e:#}");
        }

        page.goto(url.as_str())
            .await
            .with_context(|| format!("Navigation to {url} failed"))?;
        page.wait_for_navigation()
            .await
            .with_context(|| format!("Navigation to {url} did not complete"))?;

        wait_for_ready_state(&page).await;
        tokio::time::sleep(settle).await;

        let markup = page
            .content()
            .await
            .with_context(|| format!("Failed to capture content of {url}"))?;

        if let Err(e) = page.close().await {
            debug!(target: "sitebot::crawl", "Page close failed for {url}: {e}");
        }
        Ok(markup)
    }

    /// Orderly shutdown of browser, handler and profile directory
    pub async fn release(mut self) {
        let handler = self.handler.take();
        let dir = self.user_data_dir.take();
        match self.browser.take() {
            Some(browser) => {
                if let CleanupResult::PartialFailure(errors) =
                    cleanup_browser_and_data(browser, handler, dir.as_deref()).await
                {
                    debug!(target: "sitebot::cleanup", "Session cleanup incomplete: {errors:?}");
                }
            }
            None => {
                if let Some(handler) = handler {
                    handler.abort();
                }
                if let Some(dir) = dir {
                    remove_profile_dir(&dir);
                }
            }
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let handler = self.handler.take();
        let dir = self.user_data_dir.take();
        let Some(browser) = self.browser.take() else {
            if let Some(handler) = handler {
                handler.abort();
            }
            if let Some(dir) = dir {
                remove_profile_dir(&dir);
            }
            return;
        };

        debug!(target: "sitebot::cleanup", "Browser session dropped without release");
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    cleanup_browser_and_data(browser, handler, dir.as_deref()).await;
                });
            }
            Err(_) => {
                // chromiumoxide kills the child process when Browser drops
                drop(browser);
                if let Some(handler) = handler {
                    handler.abort();
                }
                if let Some(dir) = dir {
                    remove_profile_dir(&dir);
                }
            }
        }
    }
}

/// Poll `document.readyState` until it is `complete` and a body exists
///
/// Gives up quietly; the caller's timeout bounds the overall wait.
async fn wait_for_ready_state(page: &Page) {
    let script = r"
        (function() {
            return { readyState: document.readyState, bodyExists: document.body !== null };
        })()
    ";

    loop {
        match page.evaluate(script).await {
            Ok(result) => {
                if let Ok(value) = result.into_value::<serde_json::Value>() {
                    let ready = value.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                    let body = value
                        .get("bodyExists")
                        .and_then(serde_json::Value::as_bool)
                        .unwrap_or(false);
                    if ready && body {
                        return;
                    }
                }
            }
            Err(e) => {
                debug!(target: "sitebot::crawl", "Failed to check readyState: {e}, retrying");
            }
        }
        tokio::time::sleep(READY_STATE_POLL).await;
    }
}
