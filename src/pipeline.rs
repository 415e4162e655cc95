//! Action pipeline
//!
//! One invocation is one backend operation plus at most one post-action,
//! bounded by a single timeout budget, ending in one [`Page`] or one
//! [`ActionError`]. Sequencing several invocations is up to the caller.

use crate::browser::{select_backend, Backend, BackendConfig, BackendKind, PostAction};
use crate::error::{ActionError, ActionResult, Result};
use crate::extraction::Page;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// The operation that starts a pipeline invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Action {
    /// Navigate to a URL
    Open(Url),
    /// Run a script expected to trigger navigation
    ExecuteAndLoad(String),
}

/// Drives actions through one backend
pub struct ActionPipeline {
    backend: Box<dyn Backend>,
}

impl ActionPipeline {
    /// Wrap an already constructed backend
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Select and construct a backend, then wrap it
    pub async fn launch(config: BackendConfig, kind: BackendKind) -> Result<Self> {
        let backend = select_backend(config, kind).await?;
        info!("Pipeline using {} backend", backend.kind());
        Ok(Self::new(backend))
    }

    /// The active backend variant
    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Timeout budget of one invocation
    pub fn budget(&self) -> Duration {
        self.backend.config().timeout()
    }

    /// Run `action`, apply `post`, and parse the captured document.
    ///
    /// The whole invocation shares one timeout budget; backend failures are
    /// returned unchanged.
    #[instrument(skip(self, post))]
    pub async fn run(&mut self, action: Action, post: PostAction) -> ActionResult<Page> {
        let budget = self.budget();
        let backend = &mut self.backend;

        let operation = async {
            match &action {
                Action::Open(url) => backend.open_url(url, &post).await,
                Action::ExecuteAndLoad(script) => backend.execute_and_load(script, &post).await,
            }
        };

        let snapshot = tokio::time::timeout(budget, operation)
            .await
            .map_err(|_| {
                debug!("pipeline budget of {:?} exhausted", budget);
                ActionError::Timeout
            })??;

        Ok(Page::from(snapshot))
    }

    /// Open `url` and return the resulting page
    pub async fn open(&mut self, url: &Url, post: PostAction) -> ActionResult<Page> {
        self.run(Action::Open(url.clone()), post).await
    }

    /// Run a navigating script and return the resulting page
    pub async fn execute_and_load(&mut self, script: &str, post: PostAction) -> ActionResult<Page> {
        self.run(Action::ExecuteAndLoad(script.to_string()), post).await
    }

    /// Run a script and return its string result
    pub async fn execute(&mut self, script: &str) -> ActionResult<String> {
        self.backend.execute(script).await
    }

    /// The last captured page, without any network or render activity
    pub async fn current_page(&self) -> ActionResult<Page> {
        self.backend.current_content().await.map(Page::from)
    }

    /// Release the backend
    pub async fn close(self) -> Result<()> {
        self.backend.close().await
    }
}
