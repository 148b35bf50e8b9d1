//! Rate Limiter — admission control for upstream generation calls.
//!
//! One rolling 60-second window per process. This is admission control, not a
//! hard quota: the upstream enforces its own limits, this layer just keeps us
//! from slamming into them. The window lives behind a mutex so
//! increment-then-compare stays atomic under concurrent handlers.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::ai::error::AiError;

/// Window length for request counting.
const WINDOW: Duration = Duration::from_secs(60);

/// How long to wait before the single re-attempt after a denial.
const DENIAL_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Rolling-window rate limiter shared by all requests in the process.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window: Mutex<Window>,
}

impl RateLimiter {
    pub fn new(max_per_window: u32) -> Self {
        Self {
            max_per_window,
            window: Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Attempts to admit one request. Resets the window if 60 s have elapsed
    /// since it started, then grants a permit if the counter is below the
    /// ceiling. Denial is not an error; callers decide whether to wait.
    pub fn try_acquire(&self) -> bool {
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.max_per_window {
            window.count += 1;
            true
        } else {
            false
        }
    }

    /// Admission with the wait-once policy: a denied request waits 2 s and
    /// tries one more time; a second denial is a hard failure.
    pub async fn acquire(&self) -> Result<(), AiError> {
        if self.try_acquire() {
            return Ok(());
        }

        warn!(
            "Rate limit window full ({} req/min) — waiting {}ms before one retry",
            self.max_per_window,
            DENIAL_RETRY_DELAY.as_millis()
        );
        tokio::time::sleep(DENIAL_RETRY_DELAY).await;

        if self.try_acquire() {
            Ok(())
        } else {
            Err(AiError::RateLimitExceeded {
                max_per_minute: self.max_per_window,
            })
        }
    }
}
