//! Bounded retries with jittered exponential backoff for outbound HTTP.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

/// Default number of attempts, including the first.
pub const DEFAULT_ATTEMPTS: u32 = 3;

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// How often and how patiently to retry an outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// `attempts` is clamped to at least one.
    pub const fn new(attempts: u32, base_delay: Duration) -> Self {
        let attempts = if attempts == 0 { 1 } else { attempts };
        Self {
            attempts,
            base_delay,
        }
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay before attempt `attempt + 1`, scaled by `jitter` in `[0.5, 1.5)`.
    fn backoff(&self, attempt: u32, jitter: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1_u32 << exponent)
            .mul_f64(jitter)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's attempts are spent. The last error is returned.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &'static str,
    mut operation: F,
    retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.attempts && retryable(&error) => {
                let delay = policy.backoff(attempt, rand::thread_rng().gen_range(0.5..1.5));
                warn!(
                    operation = operation_name,
                    attempt,
                    ?delay,
                    error = %error,
                    "outbound call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
