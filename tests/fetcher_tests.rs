//! HTTP backend integration tests
//!
//! These run the fetcher against a local fixture server; no browser needed.

mod common;

use common::{unreachable_url, TestServer, HOME_HTML};
use pagedrive::browser::{Backend, BackendConfig, HttpBackend, PostAction};
use pagedrive::ActionError;
use std::time::{Duration, Instant};

fn backend(timeout_secs: f64) -> HttpBackend {
    let config = BackendConfig::builder()
        .user_agent("pagedrive-tests/1.0")
        .timeout_secs(timeout_secs)
        .build()
        .unwrap();
    HttpBackend::new(config).unwrap()
}

#[tokio::test]
async fn test_current_content_before_navigation() {
    let backend = backend(5.0);
    assert_eq!(backend.current_content().await, Err(ActionError::NotFound));
}

#[tokio::test]
async fn test_open_url_returns_requested_url() {
    let server = TestServer::start().await;
    let mut backend = backend(5.0);
    let url = server.url("/");

    let snapshot = backend.open_url(&url, &PostAction::None).await.unwrap();

    assert_eq!(snapshot.url.as_ref(), Some(&url));
    assert_eq!(snapshot.content, HOME_HTML.as_bytes());
}

#[tokio::test]
async fn test_open_url_follows_redirect() {
    let server = TestServer::start().await;
    let mut backend = backend(5.0);

    let snapshot = backend
        .open_url(&server.url("/redirect"), &PostAction::None)
        .await
        .unwrap();

    assert_eq!(snapshot.url, Some(server.url("/landing")));
    assert!(String::from_utf8_lossy(&snapshot.content).contains("Landed"));
}

#[tokio::test]
async fn test_current_content_matches_last_navigation() {
    let server = TestServer::start().await;
    let mut backend = backend(5.0);

    backend.open_url(&server.url("/"), &PostAction::None).await.unwrap();
    let second = backend
        .open_url(&server.url("/landing"), &PostAction::None)
        .await
        .unwrap();

    assert_eq!(backend.current_content().await, Ok(second));
}

#[tokio::test]
async fn test_wait_post_action_delays_capture() {
    let server = TestServer::start().await;
    let mut backend = backend(5.0);
    let start = Instant::now();

    let snapshot = backend
        .open_url(&server.url("/"), &PostAction::Wait(1.0))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(!snapshot.content.is_empty());
    assert_eq!(snapshot.url, Some(server.url("/")));
}

#[tokio::test]
async fn test_error_status_is_still_captured() {
    let server = TestServer::start().await;
    let mut backend = backend(5.0);

    let snapshot = backend
        .open_url(&server.url("/missing"), &PostAction::None)
        .await
        .unwrap();

    assert!(String::from_utf8_lossy(&snapshot.content).contains("Not here"));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = TestServer::start().await;
    let mut backend = backend(0.5);

    let result = backend.open_url(&server.url("/slow"), &PostAction::None).await;

    assert_eq!(result, Err(ActionError::Timeout));
    assert_eq!(backend.current_content().await, Err(ActionError::NotFound));
}

#[tokio::test]
async fn test_unreachable_host_is_network_failure() {
    let mut backend = backend(5.0);
    let result = backend.open_url(&unreachable_url().await, &PostAction::None).await;
    assert_eq!(result, Err(ActionError::NetworkFailure));
}

#[tokio::test]
async fn test_execute_not_supported() {
    let mut backend = backend(5.0);
    assert_eq!(backend.execute("1+1").await, Err(ActionError::NotSupported));
}

#[tokio::test]
async fn test_validate_post_action_not_supported() {
    let server = TestServer::start().await;
    let mut backend = backend(5.0);

    let result = backend
        .open_url(&server.url("/"), &PostAction::validate("true"))
        .await;

    assert_eq!(result, Err(ActionError::NotSupported));
    assert_eq!(backend.current_content().await, Err(ActionError::NotFound));
}
