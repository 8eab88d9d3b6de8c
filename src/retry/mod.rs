//! Retry with exponential backoff for remote calls.
//!
//! [`RetryingInvoker`] runs an async operation, retrying transient failures
//! with exponential backoff plus uniform random jitter. Failures carrying a
//! terminal status code (any 4xx except 429) are returned immediately.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::error::{classify, is_terminal_status, ApiError, ClassifiedError, StatusCoded};

/// Configuration for retry behavior with exponential backoff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Values below 1 behave as 1.
    pub max_attempts: u32,
    /// Base delay before the first retry.
    pub initial_delay: Duration,
    /// Factor applied to the base delay for each further retry.
    pub backoff_multiplier: u32,
    /// Upper bound (exclusive) of the random jitter added to each delay.
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_millis(1000),
            backoff_multiplier: 2,
            jitter_max: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the base delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the jitter bound.
    pub fn with_jitter_max(mut self, jitter: Duration) -> Self {
        self.jitter_max = jitter;
        self
    }

    /// Attempts actually permitted by this policy.
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before retry number `attempt + 1`, without jitter.
    ///
    /// `attempt` is the zero-based index of the attempt that just failed:
    /// `initial_delay * multiplier^attempt`, saturating.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        self.backoff_multiplier
            .checked_pow(attempt)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    /// Uniform random jitter in `[0, jitter_max)`.
    pub fn jitter(&self) -> Duration {
        let bound = self.jitter_max.as_millis() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..bound))
    }

    /// Full delay after the attempt with index `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay(attempt).saturating_add(self.jitter())
    }
}

/// Suspends the current task for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs remote calls under a [`RetryPolicy`].
///
/// Each `invoke` keeps its own attempt counter; nothing is shared between
/// invocations, so one invoker can serve many concurrent tool calls.
#[derive(Clone)]
pub struct RetryingInvoker {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryingInvoker {
    /// Creates an invoker that sleeps on the tokio timer.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    /// Creates an invoker with a custom sleep primitive.
    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    /// The policy this invoker applies.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `operation` until it succeeds, fails terminally, or runs out of
    /// attempts. The last failure is returned unchanged.
    pub async fn invoke<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StatusCoded + Display,
    {
        let max_attempts = self.policy.effective_max_attempts();
        let mut attempt: u32 = 0;

        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let status = error.status_code();
            if is_terminal_status(status) {
                tracing::debug!(status = ?status, error = %error, "Remote call failed terminally");
                return Err(error);
            }

            if attempt + 1 >= max_attempts {
                tracing::warn!(
                    attempts = attempt + 1,
                    status = ?status,
                    error = %error,
                    "Remote call failed, retries exhausted"
                );
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt);
            tracing::warn!(
                attempt = attempt + 1,
                status = ?status,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Remote call failed, retrying"
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    /// Like [`invoke`](Self::invoke), classifying the final failure.
    ///
    /// `context` names the operation for the error message, e.g. "list sites".
    pub async fn invoke_classified<T, F, Fut>(
        &self,
        context: &str,
        operation: F,
    ) -> Result<T, ClassifiedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.invoke(operation)
            .await
            .map_err(|error| classify(&error, context))
    }
}

impl Default for RetryingInvoker {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl std::fmt::Debug for RetryingInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingInvoker")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
