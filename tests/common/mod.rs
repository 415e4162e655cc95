//! Test server utilities for Pagedrive integration tests
//!
//! Serves a handful of fixed pages from a local axum app bound to an
//! ephemeral port.

#![allow(dead_code)]

use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

pub const HOME_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <title>Home</title>
  <meta name="description" content="Fixture home page">
</head>
<body>
  <div id="main" class="panel">
    <p>Welcome to the fixture.</p>
    <a href="/landing">Landing</a>
    <a href="https://external.example/">Elsewhere</a>
    <input name="q" value="search">
  </div>
</body>
</html>"#;

pub const LANDING_HTML: &str = "<html><head><title>Landing</title></head><body><h1>Landed</h1></body></html>";

/// Page whose title is filled in by script half a second after load
pub const LATE_TITLE_HTML: &str = r#"<html><head><title></title></head><body>
<script>setTimeout(function () { document.title = 'Ready'; }, 500);</script>
</body></html>"#;

/// Page that inserts `#late` a quarter second after load
pub const LATE_NODE_HTML: &str = r#"<html><body>
<script>setTimeout(function () {
  var el = document.createElement('div'); el.id = 'late'; document.body.appendChild(el);
}, 250);</script>
</body></html>"#;

fn app() -> Router {
    Router::new()
        .route("/", get(|| async { Html(HOME_HTML) }))
        .route("/landing", get(|| async { Html(LANDING_HTML) }))
        .route("/redirect", get(|| async { Redirect::temporary("/landing") }))
        .route("/late-title", get(|| async { Html(LATE_TITLE_HTML) }))
        .route("/late-node", get(|| async { Html(LATE_NODE_HTML) }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, Html("<h1>Not here</h1>")) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Html("<p>finally</p>")
            }),
        )
}

/// A running fixture server
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    /// Start the fixture app on 127.0.0.1 with an ephemeral port
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app()).await.unwrap();
        });
        Self { addr }
    }

    /// Absolute URL for `path` on this server
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{}", self.addr, path)).unwrap()
    }
}

/// A URL on a port nothing listens on
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/", addr)).unwrap()
}
