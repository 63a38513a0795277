//! Deferred scrape tasks
//!
//! `TaskManager::submit` returns a task id immediately and runs the scrape
//! in the background; `poll` reports pending, the stored record, or the
//! stored failure. Terminal entries are purged by a background cleanup task
//! once they are older than the retention period.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::crawl_engine::{PipelineStage, ProgressReporter, SiteScraper};
use crate::extraction::ExtractionRecord;

/// Default time a finished task stays pollable
pub const DEFAULT_TASK_RETENTION: Duration = Duration::from_secs(60 * 60);

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// What a poll returns
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPoll {
    Pending { stage: PipelineStage },
    Completed(ExtractionRecord),
    Failed { kind: String, reason: String },
    NotFound,
}

#[derive(Debug, Clone)]
enum TaskState {
    Pending(PipelineStage),
    Completed(ExtractionRecord),
    Failed { kind: String, reason: String },
}

#[derive(Debug)]
struct TaskEntry {
    site_url: String,
    state: TaskState,
    submitted_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

type TaskTable = Arc<DashMap<Uuid, TaskEntry>>;

/// Tracks deferred scrapes by UUID v4
#[derive(Clone)]
pub struct TaskManager {
    scraper: SiteScraper,
    tasks: TaskTable,
    retention: Duration,
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("tasks", &self.tasks.len())
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

/// Mirrors pipeline stages into the task table
struct TaskProgress {
    id: Uuid,
    tasks: TaskTable,
}

impl ProgressReporter for TaskProgress {
    fn report_stage(&self, stage: &PipelineStage) {
        if stage.is_terminal() {
            return;
        }
        if let Some(mut entry) = self.tasks.get_mut(&self.id)
            && matches!(entry.state, TaskState::Pending(_))
        {
            entry.state = TaskState::Pending(stage.clone());
        }
    }
}

impl TaskManager {
    #[must_use]
    pub fn new(scraper: SiteScraper) -> Self {
        Self {
            scraper,
            tasks: Arc::new(DashMap::new()),
            retention: DEFAULT_TASK_RETENTION,
        }
    }

    #[must_use]
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Start a background scrape and return its task id
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, site_url: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        let site_url = site_url.into();
        self.tasks.insert(
            id,
            TaskEntry {
                site_url: site_url.clone(),
                state: TaskState::Pending(PipelineStage::Idle),
                submitted_at: Utc::now(),
                finished_at: None,
            },
        );

        let scraper = self.scraper.clone();
        let reporter = TaskProgress {
            id,
            tasks: Arc::clone(&self.tasks),
        };
        let url = site_url.clone();
        let worker = tokio::spawn(async move { scraper.scrape_with_progress(&url, &reporter).await });

        let tasks = Arc::clone(&self.tasks);
        tokio::spawn(async move {
            let state = match worker.await {
                Ok(Ok(record)) => TaskState::Completed(record),
                Ok(Err(e)) => TaskState::Failed {
                    kind: e.kind().to_string(),
                    reason: e.to_string(),
                },
                Err(join_error) => {
                    warn!(task = %id, error = %join_error, "Scrape task aborted");
                    TaskState::Failed {
                        kind: "internal".to_string(),
                        reason: join_error.to_string(),
                    }
                }
            };
            if let Some(mut entry) = tasks.get_mut(&id) {
                entry.state = state;
                entry.finished_at = Some(Utc::now());
                debug!(task = %id, site = %entry.site_url, "Task finished");
            }
        });

        info!(task = %id, site = %site_url, "Submitted scrape task");
        id
    }

    #[must_use]
    pub fn poll(&self, id: &Uuid) -> TaskPoll {
        match self.tasks.get(id).map(|entry| entry.state.clone()) {
            Some(TaskState::Pending(stage)) => TaskPoll::Pending { stage },
            Some(TaskState::Completed(record)) => TaskPoll::Completed(record),
            Some(TaskState::Failed { kind, reason }) => TaskPoll::Failed { kind, reason },
            None => TaskPoll::NotFound,
        }
    }

    /// Poll by textual id; malformed ids are simply not found
    #[must_use]
    pub fn poll_str(&self, id: &str) -> TaskPoll {
        Uuid::parse_str(id).map_or(TaskPoll::NotFound, |id| self.poll(&id))
    }

    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Remove terminal tasks older than the retention period
    ///
    /// Returns the number of removed entries.
    pub fn cleanup_tasks(&self) -> usize {
        let now = Utc::now();
        let retention = self.retention;
        let before = self.tasks.len();

        self.tasks.retain(|id, entry| {
            let Some(finished_at) = entry.finished_at else {
                return true;
            };
            let age = now
                .signed_duration_since(finished_at)
                .to_std()
                .unwrap_or(Duration::ZERO);
            let keep = age < retention;
            if !keep {
                debug!(
                    task = %id,
                    submitted_at = %entry.submitted_at,
                    "Removing expired scrape task"
                );
            }
            keep
        });

        let removed = before.saturating_sub(self.tasks.len());
        if removed > 0 {
            info!("Cleaned up {removed} scrape tasks");
        }
        removed
    }

    /// Spawn the periodic cleanup loop (call once at startup)
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = CLEANUP_INTERVAL.min(self.retention.max(Duration::from_secs(1)));
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.cleanup_tasks();
            }
        })
    }
}
