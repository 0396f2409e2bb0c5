//! Caller-owned cancellation and deadline for a single request

use std::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::error::{Operation, Result, VendorError};

/// Execution context attached to each vendor request
///
/// Cloning shares the cancellation token; cancelling any clone aborts every
/// request running under it.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl RequestContext {
    /// Context that is never cancelled and has no deadline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context bound to an existing cancellation token
    #[must_use]
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            timeout: None,
        }
    }

    /// Add a deadline measured from the start of each request
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cancel every request running under this context
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the context has been cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `exchange` until it finishes, the token fires or the deadline passes
    ///
    /// The exchange future is dropped on cancellation, which aborts the
    /// underlying HTTP request.
    ///
    /// # Errors
    ///
    /// Returns the exchange error, or a transport error on cancellation or timeout
    pub async fn run<F, T>(&self, operation: Operation, exchange: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, exchange)
                    .await
                    .unwrap_or_else(|_| {
                        Err(VendorError::Transport {
                            operation,
                            reason: format!("deadline of {limit:?} exceeded"),
                        })
                    }),
                None => exchange.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(VendorError::Transport {
                operation,
                reason: "request cancelled".to_string(),
            }),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = RequestContext::new();
        let value = assert_ok!(ctx.run(Operation::Send, async { Ok(7) }).await);
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let ctx = RequestContext::new();
        ctx.cancel();
        assert!(ctx.is_cancelled());

        let err = assert_err!(ctx.run(Operation::Complete, async { Ok("done") }).await);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.operation(), Some(Operation::Complete));
    }

    #[tokio::test]
    async fn test_cancel_while_in_flight() {
        let ctx = RequestContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = ctx
            .run(Operation::Send, async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("late")
            })
            .await;
        assert!(matches!(result, Err(VendorError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_external_token_cancels_context() {
        let token = CancellationToken::new();
        let ctx = RequestContext::with_token(token.clone());
        assert!(!ctx.is_cancelled());

        token.cancel();
        assert!(ctx.is_cancelled());
        let err = assert_err!(ctx.run(Operation::Send, async { Ok(()) }).await);
        assert!(err.to_string().contains("request cancelled"));
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let ctx = RequestContext::new().timeout(Duration::from_millis(10));
        let err = assert_err!(
            ctx.run(Operation::Embeddings, async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await
        );
        assert!(err.to_string().contains("deadline"));
    }
}
