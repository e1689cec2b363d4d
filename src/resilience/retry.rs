//! # Transient-Fault Retry
//!
//! Wraps a remote call and retries it while it fails with a transient error
//! (HTTP 429/500/502/503/504, or a transport timeout/connect failure). The delay
//! before retry `n` (0-based) is `base_delay * 2^n`, optionally capped. Any other
//! failure is returned on the spot. When the attempt budget runs out the call
//! fails with [`SyncError::RetriesExhausted`].
//!
//! The caller is suspended for the whole backoff: nothing else in the run makes
//! progress while a call is waiting to be retried.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::error::{Result, SyncError};

/// Source of backoff delays
#[async_trait]
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    async fn sleep(&self, delay: Duration);
}

/// Real-time sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Bounded exponential backoff policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Option<Duration>,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: None,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        let mut policy = Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
        );
        policy.max_delay = config.max_delay_ms.map(Duration::from_millis);
        policy
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after the failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        let delay = self
            .base_delay
            .checked_mul(factor)
            .unwrap_or(Duration::MAX);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Execute `f` until it succeeds, fails permanently, or the budget runs out.
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            operation = operation,
                            attempts = attempt + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) if !error.is_transient() => return Err(error),
                Err(error) => {
                    if attempt + 1 >= self.max_attempts {
                        warn!(
                            operation = operation,
                            attempts = attempt + 1,
                            error = %error,
                            "⏳ Retry budget exhausted"
                        );
                        return Err(SyncError::RetriesExhausted {
                            operation: operation.to_string(),
                            attempts: attempt + 1,
                            last_error: error.to_string(),
                        });
                    }

                    let delay = self.delay_for(attempt);
                    debug!(
                        operation = operation,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "Retrying after transient error"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
