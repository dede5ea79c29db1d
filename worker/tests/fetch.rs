//! Batch fetch tests against local mock hosts
//!
//! These exercise the real reqwest fetcher: status capture, redirect following,
//! timeouts and unreachable hosts all end up in the right outcome list.

use std::collections::HashSet;
use std::time::Duration;

use shared::{InvokeRequest, default_fetch_headers};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use worker::{FetchSettings, ReqwestFetcher, run_batch};

fn fast_fetcher() -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings {
        connect_timeout: Duration::from_millis(500),
        request_timeout: Duration::from_millis(500),
        ..FetchSettings::default()
    })
    .expect("client builds")
}

#[tokio::test]
async fn test_batch_partitions_live_dead_and_errored_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let live = format!("{}/live", server.uri());
    let broken = format!("{}/broken", server.uri());
    // Nothing listens on the discard port
    let unreachable = "http://127.0.0.1:9/".to_string();

    let request = InvokeRequest::get(
        vec![live.clone(), broken.clone(), unreachable.clone()],
        default_fetch_headers(),
    );
    let response = run_batch(&fast_fetcher(), &request).await;

    assert!(response.is_well_formed());
    assert_eq!(response.len(), 3);

    let responded: Vec<(String, u16)> = response
        .url_list
        .iter()
        .cloned()
        .zip(response.status_code_list.iter().copied())
        .collect();
    assert!(responded.contains(&(live, 200)));
    assert!(responded.contains(&(broken, 500)));
    assert_eq!(response.error_url_list, vec![unreachable]);
    assert!(!response.error_list[0].is_empty());

    let responded_set: HashSet<_> = response.url_list.iter().collect();
    let errored_set: HashSet<_> = response.error_url_list.iter().collect();
    assert!(responded_set.is_disjoint(&errored_set));
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let request = InvokeRequest::get(vec![format!("{}/old", server.uri())], Default::default());
    let response = run_batch(&fast_fetcher(), &request).await;

    assert_eq!(response.status_code_list, vec![200]);
}

#[tokio::test]
async fn test_slow_host_becomes_error_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let slow = format!("{}/slow", server.uri());
    let fast = format!("{}/fast", server.uri());
    let request = InvokeRequest::get(vec![slow.clone(), fast.clone()], Default::default());
    let response = run_batch(&fast_fetcher(), &request).await;

    assert_eq!(response.url_list, vec![fast]);
    assert_eq!(response.status_code_list, vec![204]);
    assert_eq!(response.error_url_list, vec![slow]);
}

#[tokio::test]
async fn test_request_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("sec-fetch-mode", "navigate"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let request = InvokeRequest::get(vec![server.uri()], default_fetch_headers());
    let response = run_batch(&fast_fetcher(), &request).await;

    assert_eq!(response.status_code_list, vec![200]);
}
