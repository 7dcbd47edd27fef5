//! Bounded retry with exponential backoff for API requests

use std::time::Duration;

use crate::http::{HttpError, http_config};

/// Base for the backoff schedule: 10s, 20s, 40s, 80s, 160s
const BACKOFF_FACTOR: u64 = 10;

/// Exponential backoff for the given retry attempt (1-based).
/// The exponent is capped so large `--max-retries` values cannot overflow.
pub fn backoff_duration(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(32);
    Duration::from_secs(BACKOFF_FACTOR.saturating_mul(1u64 << exponent))
}

/// Retry a fallible HTTP operation with exponential backoff.
///
/// On retryable errors, logs the failure, sleeps, and retries up to
/// `max_retries` (from global [`HttpConfig`](crate::http::HttpConfig)).
///
/// Returns `Ok(T)` on first success, or the final `Err` on exhaustion /
/// non-retryable error.
pub fn retry_with_backoff<T>(
    label: &str,
    mut attempt_fn: impl FnMut() -> Result<T, HttpError>,
) -> Result<T, HttpError> {
    let max_retries = http_config().max_retries;
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                let delay = backoff_duration(attempt);
                log::warn!("{label}: attempt {attempt}/{max_retries} failed: {e}, retrying in {delay:?}");
                std::thread::sleep(delay);
            }
            Err(e) => {
                log::error!("{label}: failed permanently: {e}");
                return Err(e);
            }
        }
    }
}
