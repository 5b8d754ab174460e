//! Bounded retry with backoff for calls to the external services

use std::future::Future;
use std::time::Duration;

/// Errors classify themselves as transient (worth one more attempt) or not.
///
/// Connection failures, timeouts, and 5xx responses are transient; 4xx
/// responses and malformed payloads are not.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Retry policy shared by the embedding and search-engine clients
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Run `op`, retrying transient failures up to `max_retries` times.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Transient + std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "transient failure (attempt {attempt}/{}): {e}; retrying in {:?}",
                        self.max_retries,
                        self.backoff
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}
