//! Core types for scrape runs.
//!
//! This module contains the run-level error type, the per-page fetch result
//! and the failure classification used to turn browser errors into fetch
//! statuses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::ConfigError;

/// Run-level failure of a scrape
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScrapeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid site URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No page rendered successfully, or every rendered page was empty
    #[error("no usable content retrieved from {url} ({attempted} page(s) attempted)")]
    NoContent { url: String, attempted: usize },

    #[error("scrape of {url} exceeded the {}s run deadline", elapsed.as_secs())]
    Timeout { url: String, elapsed: Duration },

    /// A configured language-model client could not be built
    #[error("extraction error: {0}")]
    Extraction(String),
}

impl ScrapeError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Stable machine-readable discriminator used by the routing layer
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::NoContent { .. } => "no_content",
            Self::Timeout { .. } => "timeout",
            Self::Extraction(_) => "extraction",
        }
    }
}

impl From<ConfigError> for ScrapeError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<crate::content::ChunkError> for ScrapeError {
    fn from(err: crate::content::ChunkError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience alias for Result with `ScrapeError`
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Outcome of one page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Ok,
    Timeout,
    Error,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Timeout => write!(f, "timeout"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Rendered markup of one page, or the reason there is none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFetchResult {
    pub url: String,
    /// Empty unless `status` is `Ok`
    pub raw_markup: String,
    pub status: FetchStatus,
}

impl PageFetchResult {
    #[must_use]
    pub fn ok(url: impl Into<String>, raw_markup: String) -> Self {
        Self {
            url: url.into(),
            raw_markup,
            status: FetchStatus::Ok,
        }
    }

    #[must_use]
    pub fn failed(url: impl Into<String>, status: FetchStatus) -> Self {
        Self {
            url: url.into(),
            raw_markup: String::new(),
            status,
        }
    }

    /// Build a failed result from a browser error, classifying timeouts
    #[must_use]
    pub fn from_error(url: impl Into<String>, error: &anyhow::Error) -> Self {
        let status = match FailureKind::classify(error) {
            FailureKind::Timeout => FetchStatus::Timeout,
            _ => FetchStatus::Error,
        };
        Self::failed(url, status)
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }
}

/// Categorizes page failures by error message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Navigation or load exceeded its deadline
    Timeout,
    /// DNS, connection refused/reset, TLS
    Network,
    /// Browser launch, CDP or page crash
    Browser,
    Unknown,
}

impl FailureKind {
    /// Classify an error into a failure kind based on error message patterns
    #[must_use]
    pub fn classify(error: &anyhow::Error) -> Self {
        // {:#} keeps the context chain so wrapped timeouts still match
        let msg = format!("{error:#}").to_lowercase();

        if msg.contains("timeout") || msg.contains("timed out") || msg.contains("deadline") {
            return Self::Timeout;
        }

        if msg.contains("connection refused")
            || msg.contains("connection reset")
            || msg.contains("dns")
            || msg.contains("name_not_resolved")
            || msg.contains("network")
            || msg.contains("unreachable")
            || msg.contains("ssl")
            || msg.contains("certificate")
        {
            return Self::Network;
        }

        if msg.contains("browser")
            || msg.contains("chrome")
            || msg.contains("cdp")
            || msg.contains("target")
            || msg.contains("session")
            || msg.contains("page")
        {
            return Self::Browser;
        }

        Self::Unknown
    }
}
