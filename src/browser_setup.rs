//! Chromium discovery, managed download and launch
//!
//! Every renderer session launches its own browser process with a private
//! profile directory, so concurrent fetches never contend for a profile lock.

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::utils::constants::CHROME_USER_AGENT;

/// Options for one browser launch
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub headless: bool,
    /// Passed to Chromium as `--proxy-server`
    pub proxy: Option<String>,
    /// Profile directory; a fresh temp directory is used when `None`
    pub user_data_dir: Option<PathBuf>,
}

/// A launched browser with its CDP handler task and profile directory
pub struct LaunchedBrowser {
    pub browser: Browser,
    pub handler: JoinHandle<()>,
    pub user_data_dir: PathBuf,
}

/// Find a Chrome/Chromium executable on this machine.
pub async fn find_browser_executable() -> Result<PathBuf> {
    for var in ["SITEBOT_CHROMIUM_PATH", "CHROMIUM_PATH"] {
        if let Ok(path) = std::env::var(var) {
            let path = PathBuf::from(path);
            if path.exists() {
                info!("Using browser from {var}: {}", path.display());
                return Ok(path);
            }
            warn!("{var} points to non-existent file: {}", path.display());
        }
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
        ]
    };

    for candidate in candidates {
        let path = match candidate.strip_prefix("~/") {
            Some(rest) => match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            },
            None => PathBuf::from(candidate),
        };
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which': {found}");
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    warn!("No Chrome/Chromium executable found. Will download and use fetcher.");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the user cache directory.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine user cache directory, using {}",
                fallback.display()
            );
            fallback
        })
        .join("sitebot")
        .join("chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );
    Ok(revision_info.executable_path)
}

/// Removes a freshly created profile directory unless disarmed
///
/// Covers both a failed launch and a launch future dropped mid-await.
struct ProfileDirGuard {
    path: PathBuf,
    armed: bool,
}

impl ProfileDirGuard {
    fn create(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path).context("Failed to create user data directory")?;
        Ok(Self { path, armed: true })
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Hand ownership of the directory to the caller
    fn disarm(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ProfileDirGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                debug!("Could not remove profile {}: {e}", self.path.display());
            }
        }
    }
}

/// Find or download Chromium and launch it with the stealth flag set
pub async fn launch_browser(options: &LaunchOptions) -> Result<LaunchedBrowser> {
    let chrome_path = match find_browser_executable().await {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let profile = ProfileDirGuard::create(options.user_data_dir.clone().unwrap_or_else(|| {
        std::env::temp_dir().join(format!("sitebot_chrome_{}", uuid::Uuid::new_v4().simple()))
    }))?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(profile.path().clone())
        .chrome_executable(chrome_path);

    config_builder = if options.headless {
        config_builder.headless_mode(HeadlessMode::default())
    } else {
        config_builder.with_head()
    };

    if let Some(proxy) = options.proxy.as_deref() {
        config_builder = config_builder.arg(format!("--proxy-server={proxy}"));
    }

    config_builder = config_builder
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-setuid-sandbox")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-extensions")
        .arg("--disable-popup-blocking")
        .arg("--disable-background-networking")
        .arg("--disable-breakpad")
        .arg("--disable-features=TranslateUI")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    debug!("Launching browser with profile {}", profile.path().display());
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| anyhow::Error::new(e).context("Failed to launch browser"))?;
    let user_data_dir = profile.disarm();

    let handler = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let msg = e.to_string();
                // chromiumoxide cannot decode some newer CDP events; those are noise
                if msg.contains("data did not match any variant of untagged enum Message")
                    || msg.contains("Failed to deserialize WS response")
                {
                    trace!("Suppressed benign CDP serialization error: {msg}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        trace!("Browser handler task completed");
    });

    Ok(LaunchedBrowser {
        browser,
        handler,
        user_data_dir,
    })
}

/// Hide the most common automation fingerprints before navigation
pub async fn hide_automation(page: &Page) -> Result<()> {
    let script = r"
        Object.defineProperty(navigator, 'webdriver', { get: () => false });
        Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
        if (!window.chrome) { window.chrome = { runtime: {} }; }
    ";
    page.execute(AddScriptToEvaluateOnNewDocumentParams {
        source: script.to_string(),
        include_command_line_api: None,
        world_name: None,
        run_immediately: None,
    })
    .await
    .context("Failed to install automation overrides")?;
    Ok(())
}
