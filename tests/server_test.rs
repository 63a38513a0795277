//! HTTP routes driven through the router without a socket

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use kodegen_tools_sitebot::server::{AppState, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

mod common;
use common::*;

fn app(renderer: Arc<dyn kodegen_tools_sitebot::PageRenderer>) -> axum::Router {
    build_router(AppState::new(heuristic_scraper(test_config(), renderer)))
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn status_route() {
    let (status, body) = send(app(Arc::new(StaticRenderer::new())), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn sync_scrape_returns_record() {
    let (status, body) = send(
        app(Arc::new(acme_site())),
        post("/scrape", json!({"url": "acme.test"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Email"], "hello@acme.com");
    assert_eq!(body["URL"], "https://acme.test");
    assert_eq!(body.as_object().unwrap().len(), 12);
}

#[tokio::test]
async fn empty_url_is_bad_request() {
    let (status, body) = send(
        app(Arc::new(acme_site())),
        post("/scrape", json!({"url": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = send(app(Arc::new(acme_site())), post("/scrape", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn no_content_is_unprocessable() {
    let (status, body) = send(
        app(Arc::new(StaticRenderer::new())),
        post("/scrape", json!({"url": SITE})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "no_content");
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn run_timeout_is_gateway_timeout() {
    let scraper = heuristic_scraper(
        test_config_with(|b| b.run_timeout(Duration::from_millis(100))),
        Arc::new(SlowRenderer {
            delay: Duration::from_secs(30),
        }),
    );
    let (status, body) = send(
        build_router(AppState::new(scraper)),
        post("/scrape", json!({"url": SITE})),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "timeout");
}

#[tokio::test]
async fn deferred_scrape_round_trip() {
    let state = AppState::new(heuristic_scraper(test_config(), Arc::new(acme_site())));
    let router = build_router(state);

    let (status, body) = send(router.clone(), post("/scrape/async", json!({"url": SITE}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let task_id = body["task_id"].as_str().unwrap().to_string();

    let mut last = Value::Null;
    for _ in 0..200 {
        let (status, body) = send(router.clone(), get(&format!("/scrape/{task_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] != "pending" {
            last = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(last["status"], "done");
    assert_eq!(last["result"]["Email"], "hello@acme.com");
}

#[tokio::test]
async fn deferred_failure_is_reported() {
    let router = build_router(AppState::new(heuristic_scraper(
        test_config(),
        Arc::new(StaticRenderer::new()),
    )));

    let (_, body) = send(router.clone(), post("/scrape/async", json!({"url": SITE}))).await;
    let task_id = body["task_id"].as_str().unwrap().to_string();

    let mut last = Value::Null;
    for _ in 0..200 {
        let (_, body) = send(router.clone(), get(&format!("/scrape/{task_id}"))).await;
        if body["status"] != "pending" {
            last = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(last["status"], "error");
    assert_eq!(last["error"], "no_content");
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let (status, body) = send(
        app(Arc::new(StaticRenderer::new())),
        get("/scrape/00000000-0000-0000-0000-000000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
