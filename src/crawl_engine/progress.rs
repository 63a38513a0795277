//! Progress reporting abstraction for scrape runs
//!
//! The orchestrator reports every stage transition through `ProgressReporter`.
//! Callers that do not care use `NoOpProgress`.

use std::fmt;

/// Stage of a single scrape run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Crawling,
    Rendering,
    Normalizing,
    Extracting,
    Reconciling,
    Done,
    Failed(String),
}

impl PipelineStage {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Crawling => write!(f, "crawling"),
            Self::Rendering => write!(f, "rendering"),
            Self::Normalizing => write!(f, "normalizing"),
            Self::Extracting => write!(f, "extracting"),
            Self::Reconciling => write!(f, "reconciling"),
            Self::Done => write!(f, "done"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Trait for reporting run progress at key lifecycle events
///
/// Implementations can send updates to channels, log, update task state, etc.
pub trait ProgressReporter: Send + Sync {
    /// Report a stage transition
    fn report_stage(&self, stage: &PipelineStage);

    /// Report that a page finished fetching, successfully or not
    fn report_page_fetched(&self, _url: &str, _ok: bool) {}
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_stage(&self, _stage: &PipelineStage) {}
}
