//! Bounded retry for transient fetch failures.
//!
//! Disabled unless `max_retries` is raised: the default favours sending fewer
//! requests to the target site over recovering every page.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::FetchError;

/// Runs `operation`, retrying transient failures up to `max_retries` more times.
///
/// The wait before retry `n` (counting from zero) is `backoff * 2^n` plus up to
/// half of that again as random jitter. Non-transient errors are returned
/// straight away.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff: Duration,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !err.is_transient() || attempt >= max_retries {
            return Err(err);
        }

        let delay = backoff.saturating_mul(1u32 << attempt.min(16));
        let jitter_ms = u64::try_from(delay.as_millis() / 2).unwrap_or(u64::MAX);
        let delay = delay + Duration::from_millis(rand::rng().random_range(0..=jitter_ms));

        warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "Transient fetch error, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
