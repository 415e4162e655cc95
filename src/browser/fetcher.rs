//! HTTP-only backend
//!
//! Fetches documents with reqwest and never executes script. Redirects are
//! followed, so the captured URL is the last hop. A response with an error
//! status is still a document and is captured like any other.

use crate::browser::backend::{Backend, BackendKind, EngineState, PostAction, Snapshot};
use crate::browser::config::BackendConfig;
use crate::browser::wait::{Probe, Waiter};
use crate::error::{ActionError, ActionResult, BrowserError, Result};
use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Plain HTTP fetcher behind the uniform backend contract
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
    state: EngineState,
    waiter: Waiter,
}

impl HttpBackend {
    /// Build the HTTP client for `config`
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| BrowserError::ClientBuild(e.to_string()))?;

        debug!("HTTP backend ready");
        Ok(Self {
            client,
            config,
            state: EngineState::default(),
            waiter: Waiter::default(),
        })
    }
}

#[async_trait]
impl Probe for HttpBackend {
    async fn is_loading(&mut self, _deadline: Instant) -> ActionResult<bool> {
        // A fetch is complete once its body has been read.
        Ok(false)
    }

    async fn evaluate(&mut self, _script: &str, _deadline: Instant) -> ActionResult<String> {
        Err(ActionError::NotSupported)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::HttpOnly
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    #[instrument(skip(self, url, post), fields(url = %url))]
    async fn open_url(&mut self, url: &Url, post: &PostAction) -> ActionResult<Snapshot> {
        info!("Fetching {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered with status {}", url, status);
        }
        let final_url = response.url().clone();
        let content = response.bytes().await?.to_vec();

        let waiter = self.waiter;
        let timeout = self.config.timeout();
        waiter.page_load(self, timeout).await?;
        post.apply(self, &waiter, timeout).await?;

        let snapshot = Snapshot::new(content, Some(final_url));
        self.state.record(snapshot.clone());
        info!("Fetched {} bytes from {}", snapshot.content.len(), final_display(&snapshot));
        Ok(snapshot)
    }

    async fn execute(&mut self, _script: &str) -> ActionResult<String> {
        Err(ActionError::NotSupported)
    }

    async fn execute_and_load(
        &mut self,
        _script: &str,
        _post: &PostAction,
    ) -> ActionResult<Snapshot> {
        Err(ActionError::NotSupported)
    }

    async fn current_content(&self) -> ActionResult<Snapshot> {
        self.state.current()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        debug!("HTTP backend closed");
        Ok(())
    }
}

fn final_display(snapshot: &Snapshot) -> &str {
    snapshot.url.as_ref().map(Url::as_str).unwrap_or("<unknown>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = BackendConfig {
            timeout_secs: 0.0,
            ..BackendConfig::default()
        };
        assert!(HttpBackend::new(config).is_err());
    }

    #[tokio::test]
    async fn test_fresh_backend_has_no_content() {
        let backend = HttpBackend::new(BackendConfig::default()).unwrap();
        assert_eq!(backend.kind(), BackendKind::HttpOnly);
        assert_eq!(backend.current_content().await, Err(ActionError::NotFound));
    }

    #[tokio::test]
    async fn test_scripting_not_supported() {
        let mut backend = HttpBackend::new(BackendConfig::default()).unwrap();
        assert_eq!(backend.execute("1+1").await, Err(ActionError::NotSupported));
        assert_eq!(
            backend.execute_and_load("location.reload()", &PostAction::None).await,
            Err(ActionError::NotSupported)
        );
        assert_eq!(backend.current_content().await, Err(ActionError::NotFound));
    }
}
