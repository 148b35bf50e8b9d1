//! Retry/Backoff Controller — wraps one logical generation request.
//!
//! A plain loop over explicit `Result` values: each iteration's failure is a
//! value inspected by the loop, never exception-style control flow. Fallback
//! on exhaustion is the orchestrator's decision, not this layer's — the last
//! error is surfaced as-is.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::ai::error::AiError;

/// Default number of attempts per logical request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff cap between attempts.
const MAX_BACKOFF: Duration = Duration::from_millis(5000);

/// Delay before attempt `n` (1-based): none for the first attempt, then
/// 1s, 2s, 4s... capped at 5s.
fn backoff_before(attempt: u32) -> Option<Duration> {
    if attempt <= 1 {
        return None;
    }
    let exp = Duration::from_millis(1000u64.saturating_mul(1u64 << (attempt - 2).min(31)));
    Some(exp.min(MAX_BACKOFF))
}

/// Runs `op` up to `max_attempts` times, sleeping the backoff delay between
/// attempts and logging each failure at warn level. Errors that
/// [`AiError::is_retryable`] classifies as systemic end the loop immediately;
/// otherwise the first success or the last error is returned once attempts
/// are exhausted.
pub async fn execute<T, F, Fut>(max_attempts: u32, op: F) -> Result<T, AiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, AiError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_error: Option<AiError> = None;

    for attempt in 1..=max_attempts {
        if let Some(delay) = backoff_before(attempt) {
            tokio::time::sleep(delay).await;
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                warn!("Generation failed with non-retryable error: {}", e);
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "Generation attempt {}/{} failed: {}",
                    attempt, max_attempts, e
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(AiError::EmptyResponse))
}
