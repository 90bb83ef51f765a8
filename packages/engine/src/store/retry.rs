//! Bounded retry with exponential backoff for transient store failures.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::errors::domain::DomainError;
use crate::errors::store::StoreError;

/// Retry budget and backoff shape for store calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 25,
            max_delay_ms: 400,
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let base = (self.base_delay_ms << exp).min(self.max_delay_ms);
        let jitter = rand::rng().random::<u64>() % 4;
        Duration::from_millis(base + jitter)
    }
}

/// Run `op`, retrying transient failures with exponential backoff and jitter.
///
/// Everything else, domain outcomes included, passes through on the first
/// occurrence. Revision conflicts are not retried here; the caller owns that
/// loop because a conflict needs a fresh read, not a resubmit.
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    op_name: &'static str,
    mut op: F,
) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(op = op_name, attempt, "transient failure resolved by retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_transient() => {
                if attempt < policy.max_attempts {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        op = op_name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient store failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    // Reachable only with a zero-attempt policy.
    Err(last_error.unwrap_or_else(|| {
        DomainError::Store(StoreError::unavailable("retry budget allowed no attempts"))
    }))
}
