//! Deferred scrape task store

use kodegen_tools_sitebot::jobs::{TaskManager, TaskPoll};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

mod common;
use common::*;

async fn wait_for_terminal(manager: &TaskManager, id: &Uuid) -> TaskPoll {
    for _ in 0..200 {
        match manager.poll(id) {
            TaskPoll::Pending { .. } => tokio::time::sleep(Duration::from_millis(10)).await,
            other => return other,
        }
    }
    panic!("task {id} never finished");
}

#[tokio::test]
async fn completed_task_returns_record() {
    let manager = TaskManager::new(heuristic_scraper(test_config(), Arc::new(acme_site())));

    let id = manager.submit(SITE);
    match wait_for_terminal(&manager, &id).await {
        TaskPoll::Completed(record) => {
            assert_eq!(record.email, "hello@acme.com");
            assert_eq!(record.url, SITE);
        }
        other => panic!("unexpected poll result {other:?}"),
    }
}

#[tokio::test]
async fn failed_task_keeps_kind_and_reason() {
    let manager = TaskManager::new(heuristic_scraper(test_config(), Arc::new(StaticRenderer::new())));

    let id = manager.submit(SITE);
    match wait_for_terminal(&manager, &id).await {
        TaskPoll::Failed { kind, reason } => {
            assert_eq!(kind, "no_content");
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected poll result {other:?}"),
    }
}

#[tokio::test]
async fn slow_task_is_pending() {
    let scraper = heuristic_scraper(
        test_config(),
        Arc::new(SlowRenderer {
            delay: Duration::from_secs(30),
        }),
    );
    let manager = TaskManager::new(scraper);

    let id = manager.submit(SITE);
    assert!(matches!(manager.poll(&id), TaskPoll::Pending { .. }));
    assert_eq!(manager.task_count(), 1);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let manager = TaskManager::new(heuristic_scraper(test_config(), Arc::new(StaticRenderer::new())));
    assert_eq!(manager.poll(&Uuid::new_v4()), TaskPoll::NotFound);
    assert_eq!(manager.poll_str("not-a-uuid"), TaskPoll::NotFound);
}

#[tokio::test]
async fn cleanup_drops_only_finished_tasks() {
    let finished = TaskManager::new(heuristic_scraper(test_config(), Arc::new(acme_site())))
        .with_retention(Duration::ZERO);
    let id = finished.submit(SITE);
    wait_for_terminal(&finished, &id).await;

    let slow = TaskManager::new(heuristic_scraper(
        test_config(),
        Arc::new(SlowRenderer {
            delay: Duration::from_secs(30),
        }),
    ))
    .with_retention(Duration::ZERO);
    slow.submit(SITE);

    assert_eq!(finished.cleanup_tasks(), 1);
    assert_eq!(finished.poll(&id), TaskPoll::NotFound);
    assert_eq!(slow.cleanup_tasks(), 0);
    assert_eq!(slow.task_count(), 1);
}
