//! Retry logic with exponential backoff for service operations.
//!
//! Only errors classified as [`ErrorRetryStrategy::Retry`] (lost or exhausted database
//! connections) are retried. Remote API failures are never retried here: the next
//! reconciliation job or the periodic resync recomputes desired state from scratch.

use std::time::Duration;

use dioxus_logger::tracing;

use crate::server::error::{retry::ErrorRetryStrategy, Error};

/// Context for service methods providing retry logic
pub struct RetryContext<T> {
    /// State shared between attempts, e.g. results that should not be recomputed
    cache: T,
    /// Max attempts before failure
    max_attempts: u32,
    /// Backoff before the first retry, doubled on every further retry
    initial_backoff: Duration,
}

impl<T> RetryContext<T>
where
    T: Clone + Default,
{
    const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::with_backoff(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_INITIAL_BACKOFF)
    }

    /// Creates a context with a custom attempt limit and initial backoff
    pub fn with_backoff(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            cache: T::default(),
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Execute a method with automatic retry logic
    ///
    /// The operation receives the context's cache which persists between attempts.
    ///
    /// # Arguments
    /// - `description`: Description of the operation for logging (e.g., "reconcile Discord for user 1")
    /// - `operation`: Async function performing the work
    pub async fn execute_with_retry<R, F>(
        &mut self,
        description: &str,
        operation: F,
    ) -> Result<R, Error>
    where
        F: for<'a> Fn(
            &'a mut T,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<R, Error>> + Send + 'a>,
        >,
    {
        let mut attempt_count = 0;

        loop {
            tracing::debug!(
                "Processing {} (attempt {}/{})",
                description,
                attempt_count + 1,
                self.max_attempts
            );

            match operation(&mut self.cache).await {
                Ok(result) => {
                    tracing::debug!("Successfully processed {}", description);
                    return Ok(result);
                }
                Err(e) => match e.to_retry_strategy() {
                    ErrorRetryStrategy::Fail => {
                        return Err(e);
                    }
                    ErrorRetryStrategy::Retry => {
                        attempt_count += 1;
                        if attempt_count >= self.max_attempts {
                            tracing::error!(
                                "Max attempts ({}) exceeded for {}: {:?}",
                                self.max_attempts,
                                description,
                                e
                            );
                            return Err(e);
                        }

                        let backoff = self.initial_backoff * 2_u32.pow(attempt_count - 1);

                        tracing::warn!(
                            "Retrying {} (attempt {}/{}) after {:?}: {:?}",
                            description,
                            attempt_count,
                            self.max_attempts,
                            backoff,
                            e
                        );

                        tokio::time::sleep(backoff).await;
                    }
                },
            }
        }
    }
}

impl<T> Default for RetryContext<T>
where
    T: Clone + Default,
{
    fn default() -> Self {
        Self::new()
    }
}
