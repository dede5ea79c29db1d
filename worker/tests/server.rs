//! Worker HTTP surface tests
//!
//! Each test binds the router to an ephemeral port and talks to it over real HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};
use shared::{FetchOutcome, InvokeResponse, WorkerIndex};
use tokio::net::TcpListener;
use worker::{MockUrlFetcher, WorkerState, build_router, serve};

async fn spawn_worker(fetcher: MockUrlFetcher, index: u32) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(Arc::new(WorkerState::new(WorkerIndex::new(index), fetcher)));
    tokio::spawn(async move {
        let _ = serve(listener, router).await;
    });
    addr
}

#[tokio::test]
async fn test_invoke_returns_partitioned_response() {
    let mut fetcher = MockUrlFetcher::new();
    fetcher.expect_fetch().returning(|url, _| match url {
        "http://a.test" => FetchOutcome::Success(200),
        "http://b.test" => FetchOutcome::Success(500),
        _ => FetchOutcome::Error("dns error: no such host".to_string()),
    });
    let addr = spawn_worker(fetcher, 0).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/invoke"))
        .json(&json!({
            "urls": ["http://a.test", "http://b.test", "http://c.test"],
            "headers": {"accept": "text/html"}
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: InvokeResponse = response.json().await.unwrap();
    assert_eq!(body.url_list, vec!["http://a.test", "http://b.test"]);
    assert_eq!(body.status_code_list, vec![200, 500]);
    assert_eq!(body.error_url_list, vec!["http://c.test"]);
    assert_eq!(body.error_list, vec!["dns error: no such host"]);
}

#[tokio::test]
async fn test_legacy_url_list_key_is_accepted() {
    let mut fetcher = MockUrlFetcher::new();
    fetcher.expect_fetch().times(1).returning(|_, _| FetchOutcome::Success(200));
    let addr = spawn_worker(fetcher, 1).await;

    let body: Value = reqwest::Client::new()
        .post(format!("http://{addr}/invoke"))
        .json(&json!({"method": "GET", "url_list": ["http://a.test"]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["urlList"], json!(["http://a.test"]));
    assert_eq!(body["statusCodeList"], json!([200]));
}

#[tokio::test]
async fn test_unsupported_method_is_rejected_without_result_fields() {
    let mut fetcher = MockUrlFetcher::new();
    fetcher.expect_fetch().times(0);
    let addr = spawn_worker(fetcher, 2).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/invoke"))
        .json(&json!({"method": "POST", "urls": ["http://a.test"]}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body.get("urlList").is_none());
    assert!(body["errorMessage"].as_str().unwrap().contains("POST"));
}

#[tokio::test]
async fn test_health_reports_worker_index() {
    let addr = spawn_worker(MockUrlFetcher::new(), 7).await;

    let body: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"status": "ok", "worker": 7}));
}
