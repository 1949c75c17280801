//! Bounded retry with exponential backoff for product fetches.
//!
//! Every [`ScrapeError`] kind coming out of a fetch is treated as retryable;
//! the timeout/HTTP/network distinction is only surfaced in the final error
//! once attempts are exhausted.

use std::future::Future;
use std::time::Duration;

use crate::error::ScrapeError;

/// Executes `operation` up to `max_attempts` times with exponential backoff
/// between attempts.
///
/// Attempts are 1-indexed: after attempt `k` fails (`k < max_attempts`), the
/// controller sleeps `base_delay * 2^(k-1)` and tries again. With the default
/// policy (3 attempts, 1 s base) the delays are 1 s and 2 s. When all
/// attempts fail, the last observed error is returned.
///
/// `max_attempts` of 0 is treated as 1.
pub async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                // Exponent capped so the shift cannot overflow on extreme configs.
                let delay = base_delay.saturating_mul(1u32 << (attempt - 1).min(31));
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "fetch attempt failed — retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
