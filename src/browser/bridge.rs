//! Continuation bridge
//!
//! Native engines report script results through a one-shot callback fired on
//! their own event loop. [`Completion::begin`] hands such an engine a
//! [`CompletionToken`] and returns a future that resolves exactly once, with
//! whatever the token was resumed with.
//!
//! A token is consumed by [`CompletionToken::resume`], so a second resume is
//! a compile error. A token dropped without being resumed resolves the completion with
//! [`ActionError::NetworkFailure`]: the execution channel died.

use crate::error::{ActionError, ActionResult};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;

/// Create a linked token/completion pair
pub fn completion<T>() -> (CompletionToken<T>, Completion<T>) {
    let (tx, rx) = oneshot::channel();
    (CompletionToken { tx }, Completion { rx })
}

/// Write side of the bridge, handed to the native engine
#[derive(Debug)]
pub struct CompletionToken<T> {
    tx: oneshot::Sender<ActionResult<T>>,
}

impl<T> CompletionToken<T> {
    /// Resume the suspended caller with the native outcome
    pub fn resume(self, outcome: ActionResult<T>) {
        if self.tx.send(outcome).is_err() {
            // The waiter gave up (deadline or cancellation); nothing to wake.
            debug!("completion resumed after its waiter was dropped");
        }
    }
}

/// Read side of the bridge: resolves once with the native outcome
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion<T> {
    rx: oneshot::Receiver<ActionResult<T>>,
}

impl<T> Completion<T> {
    /// Start a native operation and return the completion it will resume.
    ///
    /// `start` receives the token and must arrange for it to be resumed from
    /// the engine's callback; it should not block.
    pub fn begin<F>(start: F) -> Self
    where
        F: FnOnce(CompletionToken<T>),
    {
        let (token, completion) = completion();
        start(token);
        completion
    }

    /// Await the outcome, giving up with [`ActionError::Timeout`] at `deadline`
    pub async fn wait_until(self, deadline: Instant) -> ActionResult<T> {
        match tokio::time::timeout_at(deadline, self).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ActionError::Timeout),
        }
    }
}

impl<T> Future for Completion<T> {
    type Output = ActionResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => {
                debug!("completion token dropped without resuming");
                Poll::Ready(Err(ActionError::NetworkFailure))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resume_delivers_value() {
        let completion = Completion::begin(|token| {
            tokio::spawn(async move { token.resume(Ok("42".to_string())) });
        });
        assert_eq!(completion.await, Ok("42".to_string()));
    }

    #[tokio::test]
    async fn test_resume_delivers_error() {
        let completion: Completion<String> = Completion::begin(|token| {
            token.resume(Err(ActionError::NetworkFailure));
        });
        assert_eq!(completion.await, Err(ActionError::NetworkFailure));
    }

    #[tokio::test]
    async fn test_dropped_token_is_network_failure() {
        let completion: Completion<String> = Completion::begin(drop);
        assert_eq!(completion.await, Err(ActionError::NetworkFailure));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_times_out() {
        let (_token, completion) = completion::<String>();
        let deadline = Instant::now() + Duration::from_millis(200);
        assert_eq!(completion.wait_until(deadline).await, Err(ActionError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_resolves_before_deadline() {
        let completion = Completion::begin(|token| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                token.resume(Ok(1u8));
            });
        });
        let deadline = Instant::now() + Duration::from_secs(1);
        assert_eq!(completion.wait_until(deadline).await, Ok(1));
    }

    #[test]
    fn test_resume_after_waiter_dropped_is_silent() {
        let (token, completion) = completion::<u8>();
        drop(completion);
        token.resume(Ok(1));
    }
}
