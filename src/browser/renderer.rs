//! Full JavaScript renderer backend
//!
//! Drives a headless Chromium over CDP through chromiumoxide. The browser
//! process, its event-loop task and the single page it renders into are all
//! owned by [`RendererBackend`]: acquired in [`RendererBackend::launch`],
//! released by [`Backend::close`] or, failing that, on drop.

use crate::browser::backend::{
    Backend, BackendKind, EngineState, PostAction, Snapshot, NAVIGATION_GRACE,
};
use crate::browser::bridge::Completion;
use crate::browser::config::BackendConfig;
use crate::browser::stealth;
use crate::browser::wait::{deadline_after, Probe, Waiter};
use crate::error::{ActionError, ActionResult, BrowserError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Readiness check used by the page-load wait
const LOADING_SCRIPT: &str = "document.readyState !== 'complete'";

/// Render a CDP evaluation result the way predicate checks expect
pub(crate) fn stringify(value: Option<&serde_json::Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Stop the event-loop task when a launch step fails
fn abort_on_failure<T, E>(
    handler: &JoinHandle<()>,
    result: std::result::Result<T, E>,
) -> std::result::Result<T, E> {
    if result.is_err() {
        handler.abort();
    }
    result
}

/// Headless Chromium behind the uniform backend contract
pub struct RendererBackend {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    config: BackendConfig,
    state: EngineState,
    waiter: Waiter,
}

impl RendererBackend {
    /// Launch a browser and open the page this backend renders into
    #[instrument(skip(config))]
    pub async fn launch(config: BackendConfig) -> Result<Self> {
        config.validate()?;
        info!("Launching renderer: headless={}", config.headless);

        let mut builder = CdpBrowserConfig::builder()
            .viewport(Viewport {
                width: config.width,
                height: config.height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            })
            .request_timeout(config.timeout())
            .arg(format!("--user-agent={}", config.user_agent));

        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        for arg in &config.extra_args {
            builder = builder.arg(arg);
        }

        let cdp_config = builder.build().map_err(BrowserError::InvalidConfig)?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // The CDP event loop runs on its own task, so awaiting a page
        // operation never needs to pump it by hand.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Renderer event loop error: {}", e);
                    break;
                }
            }
            debug!("Renderer event loop finished");
        });

        let page = abort_on_failure(&handler, browser.new_page("about:blank").await)
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;

        if config.stealth {
            abort_on_failure(&handler, stealth::apply(&page, &config.user_agent).await)?;
        }

        info!("Renderer ready");
        Ok(Self {
            browser,
            handler,
            page,
            config,
            state: EngineState::default(),
            waiter: Waiter::default(),
        })
    }

    /// Hand `script` to the page and return the completion its result resumes
    fn dispatch(&self, script: &str) -> Completion<String> {
        let page = self.page.clone();
        let script = script.to_string();
        Completion::begin(move |token| {
            tokio::spawn(async move {
                let outcome = page
                    .evaluate(script)
                    .await
                    .map(|result| stringify(result.value()))
                    .map_err(ActionError::from);
                token.resume(outcome);
            });
        })
    }

    /// Read the rendered document and its URL, and record them
    async fn capture(&mut self) -> ActionResult<Snapshot> {
        let html = self.page.content().await?;
        let url = self
            .page
            .url()
            .await?
            .and_then(|raw| Url::parse(&raw).ok());

        let snapshot = Snapshot::new(html.into_bytes(), url);
        self.state.record(snapshot.clone());
        debug!("Captured {} bytes", snapshot.content.len());
        Ok(snapshot)
    }

    /// Load wait, then post-action, then capture
    async fn settle(&mut self, post: &PostAction) -> ActionResult<Snapshot> {
        let waiter = self.waiter;
        let timeout = self.config.timeout();
        waiter.page_load(self, timeout).await?;
        post.apply(self, &waiter, timeout).await?;
        self.capture().await
    }
}

#[async_trait]
impl Probe for RendererBackend {
    async fn is_loading(&mut self, deadline: Instant) -> ActionResult<bool> {
        let result = self.dispatch(LOADING_SCRIPT).wait_until(deadline).await?;
        Ok(result == "true")
    }

    async fn evaluate(&mut self, script: &str, deadline: Instant) -> ActionResult<String> {
        self.dispatch(script).wait_until(deadline).await
    }
}

#[async_trait]
impl Backend for RendererBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Renderer
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    #[instrument(skip(self, url, post), fields(url = %url))]
    async fn open_url(&mut self, url: &Url, post: &PostAction) -> ActionResult<Snapshot> {
        info!("Opening {}", url);
        tokio::time::timeout(self.config.timeout(), self.page.goto(url.as_str()))
            .await
            .map_err(|_| ActionError::Timeout)??;

        let snapshot = self.settle(post).await?;
        info!(
            "Opened {} -> {}",
            url,
            snapshot.url.as_ref().map(Url::as_str).unwrap_or("<unknown>")
        );
        Ok(snapshot)
    }

    #[instrument(skip(self, script))]
    async fn execute(&mut self, script: &str) -> ActionResult<String> {
        let deadline = deadline_after(self.config.timeout());
        self.dispatch(script).wait_until(deadline).await
    }

    #[instrument(skip(self, script, post))]
    async fn execute_and_load(
        &mut self,
        script: &str,
        post: &PostAction,
    ) -> ActionResult<Snapshot> {
        self.execute(script).await?;
        tokio::time::sleep(NAVIGATION_GRACE).await;
        self.settle(post).await
    }

    async fn current_content(&self) -> ActionResult<Snapshot> {
        self.state.current()
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        info!("Closing renderer");
        if let Err(e) = self.browser.close().await {
            warn!("Renderer did not close cleanly: {}", e);
        }
        let _ = tokio::time::timeout(Duration::from_secs(5), &mut self.handler).await;
        Ok(())
    }
}

impl Drop for RendererBackend {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
