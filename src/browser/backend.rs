//! Backend capability contract
//!
//! Every rendering backend, whether it runs JavaScript or only fetches over
//! HTTP, implements the same four operations. The pipeline and the wait logic
//! only ever see this trait.

use crate::browser::config::BackendConfig;
use crate::browser::wait::{Probe, Waiter};
use crate::error::{ActionError, ActionResult, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Pause between a navigation script returning and the load wait starting.
///
/// Script-driven navigation is not signalled synchronously; this gives the
/// engine time to flip into its loading state first.
pub const NAVIGATION_GRACE: Duration = Duration::from_millis(250);

/// What to do after a navigation/script step settles and before capture
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PostAction {
    /// Capture immediately
    #[default]
    None,
    /// Sleep for the given number of seconds
    Wait(f64),
    /// Poll the predicate script until it returns `"true"` or `"1"`
    Validate(String),
}

impl PostAction {
    /// Fixed wait, clamped to zero for negative or NaN input
    pub fn wait(secs: f64) -> Self {
        PostAction::Wait(secs.max(0.0))
    }

    /// Predicate validation
    pub fn validate<S: Into<String>>(script: S) -> Self {
        PostAction::Validate(script.into())
    }

    /// Apply this action against `probe`.
    ///
    /// Must only be called once the triggering navigation has settled.
    pub async fn apply<P>(&self, probe: &mut P, waiter: &Waiter, timeout: Duration) -> ActionResult<()>
    where
        P: Probe + ?Sized,
    {
        match self {
            PostAction::None => Ok(()),
            PostAction::Wait(secs) => {
                let pause = Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX);
                tokio::time::sleep(pause).await;
                Ok(())
            }
            PostAction::Validate(script) => waiter.condition(probe, script, timeout).await,
        }
    }
}

/// A captured document and the URL it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Raw document bytes
    pub content: Vec<u8>,
    /// Final URL after redirects or script-driven navigation
    pub url: Option<Url>,
}

impl Snapshot {
    /// Create a snapshot
    pub fn new(content: Vec<u8>, url: Option<Url>) -> Self {
        Self { content, url }
    }
}

/// Per-session record of the last successful capture.
///
/// Content and URL live in one [`Snapshot`], so they can only change together.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    last: Option<Snapshot>,
}

impl EngineState {
    /// Record a successful capture
    pub fn record(&mut self, snapshot: Snapshot) {
        self.last = Some(snapshot);
    }

    /// The last capture, or [`ActionError::NotFound`] before any navigation
    pub fn current(&self) -> ActionResult<Snapshot> {
        self.last.clone().ok_or(ActionError::NotFound)
    }

    /// Whether any navigation has succeeded yet
    pub fn has_content(&self) -> bool {
        self.last.is_some()
    }
}

/// Which backend variant to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Full JavaScript-capable renderer
    Renderer,
    /// HTTP-only fetcher, no script execution
    #[serde(rename = "http")]
    HttpOnly,
    /// Renderer when one can be launched, HTTP fetcher otherwise
    #[default]
    Auto,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Renderer => "renderer",
            BackendKind::HttpOnly => "http",
            BackendKind::Auto => "auto",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "renderer" | "chromium" | "cdp" => Ok(BackendKind::Renderer),
            "http" | "http-only" | "fetch" => Ok(BackendKind::HttpOnly),
            "auto" => Ok(BackendKind::Auto),
            other => Err(format!(
                "unknown backend '{}', expected renderer, http or auto",
                other
            )),
        }
    }
}

/// The uniform capability contract.
///
/// Receivers are `&mut self`: one backend instance serves one logical
/// operation at a time.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Which variant this is
    fn kind(&self) -> BackendKind;

    /// Configuration fixed at construction
    fn config(&self) -> &BackendConfig;

    /// Navigate to `url`, wait for load, apply `post`, capture
    async fn open_url(&mut self, url: &Url, post: &PostAction) -> ActionResult<Snapshot>;

    /// Run `script` against the current document and return its string result
    async fn execute(&mut self, script: &str) -> ActionResult<String>;

    /// Run a script that may navigate, wait for load again, apply `post`, capture
    async fn execute_and_load(&mut self, script: &str, post: &PostAction)
        -> ActionResult<Snapshot>;

    /// The last capture, without touching the network or the renderer
    async fn current_content(&self) -> ActionResult<Snapshot>;

    /// Release native resources
    async fn close(self: Box<Self>) -> Result<()>;
}
