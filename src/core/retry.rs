//! Bounded retry of whole-batch transfers
//!
//! Remote repositories don't offer partial commits, so a failed batch is
//! retried as a whole. Retries are immediate and the first failure is the
//! one surfaced once every attempt is used up.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, info, warn};

/// Lowest number of attempts a policy allows
pub const MIN_ATTEMPTS: u32 = 1;

/// Highest number of attempts a policy allows
pub const MAX_ATTEMPTS: u32 = 10;

/// Attempt budget for one batch transfer, clamped to [1, 10]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Create a policy from a requested attempt count
    ///
    /// # Examples
    ///
    /// ```
    /// use deferred_deployer::core::RetryPolicy;
    ///
    /// assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
    /// assert_eq!(RetryPolicy::new(3).max_attempts(), 3);
    /// assert_eq!(RetryPolicy::new(50).max_attempts(), 10);
    /// ```
    pub fn new(requested: i64) -> Self {
        let max_attempts = requested.clamp(MIN_ATTEMPTS as i64, MAX_ATTEMPTS as i64) as u32;
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MIN_ATTEMPTS as i64)
    }
}

impl From<i64> for RetryPolicy {
    fn from(requested: i64) -> Self {
        Self::new(requested)
    }
}

impl From<RetryPolicy> for i64 {
    fn from(policy: RetryPolicy) -> Self {
        policy.max_attempts as i64
    }
}

/// All attempts failed
#[derive(Debug, Clone, PartialEq)]
pub struct RetryExhausted<E> {
    /// The failure of the first attempt
    pub first_error: E,
    /// Number of attempts made
    pub attempts: u32,
}

/// Retry manager for executing a batch operation under a [`RetryPolicy`]
///
/// # Examples
///
/// ```no_run
/// use deferred_deployer::core::{RetryManager, RetryPolicy, TransferError};
///
/// # async fn example() {
/// let manager = RetryManager::new(RetryPolicy::new(3));
///
/// let result = manager
///     .retry(|| async { Ok::<_, TransferError>("uploaded") })
///     .await;
///
/// assert!(result.is_ok());
/// # }
/// ```
pub struct RetryManager {
    policy: RetryPolicy,
}

impl RetryManager {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Execute the given async operation until it succeeds or the policy is used up
    ///
    /// Returns the value of the first successful attempt. When every attempt
    /// fails, the error of the *first* attempt is returned together with the
    /// number of attempts made.
    pub async fn retry<F, Fut, T, E>(&self, mut operation: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.policy.max_attempts();
        let mut first_error: Option<E> = None;
        let mut attempt = 0;

        loop {
            attempt += 1;
            if attempt > 1 {
                info!("Retrying deployment attempt {} of {}", attempt, max_attempts);
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt >= max_attempts => {
                    debug!("Final attempt {} failed: {}", attempt, error);
                    return Err(RetryExhausted {
                        first_error: first_error.unwrap_or(error),
                        attempts: attempt,
                    });
                }
                Err(error) => {
                    warn!("Encountered issue during deployment: {}", error);
                    first_error.get_or_insert(error);
                }
            }
        }
    }
}
