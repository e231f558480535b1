// crates/access-handler-core/src/context.rs
// ============================================================================
// Module: Invocation Context
// Description: Cancellation and deadline scope for handler calls.
// Purpose: Let callers abort in-flight calls and bound their latency.
// Dependencies: tokio, tokio-util
// ============================================================================

//! ## Overview
//! Every runtime operation receives an [`InvocationContext`]. Cancelling the
//! context aborts the calls running under it and under every child context.
//! Without an explicit timeout, a call is bounded only by the invocation
//! platform's own per-call ceiling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::interfaces::RuntimeError;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Cancellation-aware execution scope for handler calls.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// Token observed by every call run under this context.
    cancellation: CancellationToken,
    /// Optional deadline applied to each call.
    timeout: Option<Duration>,
}

impl InvocationContext {
    /// Creates a root context with no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context observing an existing cancellation token.
    #[must_use]
    pub const fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            timeout: None,
        }
    }

    /// Returns this context with a per-call deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns this context with an optional per-call deadline.
    #[must_use]
    pub const fn with_optional_timeout(mut self, timeout: Option<Duration>) -> Self {
        if timeout.is_some() {
            self.timeout = timeout;
        }
        self
    }

    /// Derives a context that is cancelled with this one but can be cancelled alone.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
            timeout: self.timeout,
        }
    }

    /// Cancels this context and its children.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Returns true once the context has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Returns the per-call deadline, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Runs a call under this context's cancellation and deadline.
    ///
    /// The call future is dropped as soon as the context is cancelled or the
    /// deadline elapses.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Cancelled`] or [`RuntimeError::Timeout`] when the
    /// call is cut short, otherwise the call's own result.
    pub async fn run<F, T>(&self, call: F) -> Result<T, RuntimeError>
    where
        F: Future<Output = Result<T, RuntimeError>>,
    {
        if self.is_cancelled() {
            return Err(RuntimeError::Cancelled);
        }
        let timeout = self.timeout;
        let bounded = async move {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(_) => Err(RuntimeError::Timeout {
                        timeout_ms: duration_ms(limit),
                    }),
                },
                None => call.await,
            }
        };
        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(RuntimeError::Cancelled),
            result = bounded => result,
        }
    }
}

/// Converts a duration to whole milliseconds, saturating.
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use std::time::Duration;

    use super::InvocationContext;
    use crate::interfaces::RuntimeError;

    #[tokio::test]
    async fn run_returns_call_result() {
        let ctx = InvocationContext::new();
        let value = ctx.run(async { Ok::<_, RuntimeError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn run_times_out_slow_calls() {
        let ctx = InvocationContext::new().with_timeout(Duration::from_millis(10));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, RuntimeError>(())
            })
            .await;
        assert_eq!(
            result,
            Err(RuntimeError::Timeout {
                timeout_ms: 10
            })
        );
    }

    #[tokio::test]
    async fn cancelling_parent_cancels_child_calls() {
        let parent = InvocationContext::new();
        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
        let result = child.run(async { Ok::<_, RuntimeError>(()) }).await;
        assert_eq!(result, Err(RuntimeError::Cancelled));
    }

    #[tokio::test]
    async fn cancelling_child_leaves_parent_running() {
        let parent = InvocationContext::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());
    }
}
