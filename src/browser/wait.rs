//! Wait state machine
//!
//! Every primitive here follows the same discipline: compute the deadline
//! once at entry, then sample, check the deadline, sleep, and sample again.
//! Satisfaction is checked before the deadline inside each iteration, so a
//! condition that turns true on the last sample still wins. The last sample
//! is dispatched on the deadline tick, so samples are allowed to resolve up to
//! half a poll interval past the deadline.

use crate::error::{ActionError, ActionResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Fixed sleep between successive samples
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Stand-in for "never" when a deadline would overflow `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + timeout`, saturating instead of overflowing
pub(crate) fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// What the wait loops need to sample from a backend.
///
/// `deadline` is the latest instant the sample may resolve at; implementations
/// bound any native call they make with it so a hung engine surfaces as
/// [`ActionError::Timeout`].
#[async_trait]
pub trait Probe: Send {
    /// Whether a navigation is still in flight
    async fn is_loading(&mut self, deadline: Instant) -> ActionResult<bool>;

    /// Evaluate `script` against the current document and stringify the result
    async fn evaluate(&mut self, script: &str, deadline: Instant) -> ActionResult<String>;
}

/// Page load progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// A navigation is in flight
    Loading,
    /// The document has settled
    Ready,
}

/// Whether a predicate script result counts as satisfied
pub fn is_truthy(result: &str) -> bool {
    matches!(result, "true" | "1")
}

/// Predicate script testing whether `selector` matches a node.
///
/// The selector is embedded as a JSON string literal, which is also a valid
/// JavaScript string literal, so quotes, backslashes and line terminators in
/// it cannot escape the generated script.
pub fn selector_script(selector: &str) -> String {
    let literal = serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string());
    format!("document.querySelector({}) !== null", literal)
}

/// Runs the wait primitives with a given poll interval
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    poll_interval: Duration,
}

impl Default for Waiter {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl Waiter {
    /// Create a waiter with a custom poll interval
    pub fn with_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// The interval between samples
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Sleep one interval, never past `deadline`
    async fn pause(&self, deadline: Instant) {
        let next = Instant::now()
            .checked_add(self.poll_interval)
            .unwrap_or(deadline);
        tokio::time::sleep_until(next.min(deadline)).await;
    }

    /// Bound for a single sample taken while waiting for `deadline`
    fn sample_bound(&self, deadline: Instant) -> Instant {
        deadline
            .checked_add(self.poll_interval / 2)
            .unwrap_or(deadline)
    }

    /// Wait until no navigation is in flight
    #[instrument(skip(self, probe))]
    pub async fn page_load<P>(&self, probe: &mut P, timeout: Duration) -> ActionResult<()>
    where
        P: Probe + ?Sized,
    {
        let deadline = deadline_after(timeout);
        let bound = self.sample_bound(deadline);
        let mut state = LoadState::Loading;
        let mut polls = 0u32;

        while state == LoadState::Loading {
            polls += 1;
            if !probe.is_loading(bound).await? {
                state = LoadState::Ready;
                continue;
            }
            if Instant::now() >= deadline {
                debug!("page still loading after {} polls", polls);
                return Err(ActionError::Timeout);
            }
            self.pause(deadline).await;
        }

        debug!("page ready after {} polls", polls);
        Ok(())
    }

    /// Wait until `predicate` evaluates to `"true"` or `"1"`.
    ///
    /// Evaluation errors propagate immediately.
    #[instrument(skip(self, probe))]
    pub async fn condition<P>(
        &self,
        probe: &mut P,
        predicate: &str,
        timeout: Duration,
    ) -> ActionResult<()>
    where
        P: Probe + ?Sized,
    {
        let deadline = deadline_after(timeout);
        let bound = self.sample_bound(deadline);
        let mut polls = 0u32;

        loop {
            polls += 1;
            let result = probe.evaluate(predicate, bound).await?;
            if is_truthy(&result) {
                debug!("condition satisfied after {} polls", polls);
                return Ok(());
            }
            if Instant::now() >= deadline {
                debug!("condition unsatisfied after {} polls, last result {:?}", polls, result);
                return Err(ActionError::Timeout);
            }
            self.pause(deadline).await;
        }
    }

    /// Wait until a node matching `selector` exists
    pub async fn selector<P>(
        &self,
        probe: &mut P,
        selector: &str,
        timeout: Duration,
    ) -> ActionResult<()>
    where
        P: Probe + ?Sized,
    {
        self.condition(probe, &selector_script(selector), timeout).await
    }

    /// Wait for a quiet period of `idle`.
    ///
    /// In-flight requests are not inspected; this only guarantees that `idle`
    /// has elapsed. An `idle` longer than `timeout` sleeps until the deadline
    /// and fails.
    pub async fn network_idle(&self, idle: Duration, timeout: Duration) -> ActionResult<()> {
        if idle > timeout {
            tokio::time::sleep(timeout).await;
            return Err(ActionError::Timeout);
        }
        tokio::time::sleep(idle).await;
        Ok(())
    }
}
