//! HTTP surface over axum
//!
//! Synchronous and deferred scrape endpoints plus a status endpoint. Run
//! failures are translated into `{"error": kind, "detail": reason}` bodies.

pub mod routes;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tracing::info;

use crate::crawl_engine::SiteScraper;
use crate::jobs::TaskManager;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub scraper: SiteScraper,
    pub tasks: Arc<TaskManager>,
}

impl AppState {
    /// State whose task manager runs scrapes with the same scraper
    #[must_use]
    pub fn new(scraper: SiteScraper) -> Self {
        let tasks = Arc::new(TaskManager::new(scraper.clone()));
        Self { scraper, tasks }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::status))
        .route("/scrape", post(routes::scrape))
        .route("/scrape/async", post(routes::submit))
        .route("/scrape/:task_id", get(routes::poll))
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let cleanup = Arc::clone(&state.tasks).start_cleanup_task();

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed");

    cleanup.abort();
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
