//! Header-driven rate limiting for the reference API.
//!
//! The window is whatever the remote last reported. When it says nothing is
//! left and the reset is still ahead, [`RateLimiter::acquire`] sleeps until the
//! reset and then lets the call through without re-checking; the next
//! response corrects the state.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::models::RateLimitWindow;
use crate::domain::ports::Clock;

pub struct RateLimiter {
    window: RwLock<Option<RateLimitWindow>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            window: RwLock::new(None),
            clock,
        }
    }

    /// Last observed window, if any response has reported one.
    pub async fn window(&self) -> Option<RateLimitWindow> {
        *self.window.read().await
    }

    /// Record the window reported by a response.
    pub async fn update(&self, window: RateLimitWindow) {
        debug!(
            limit = window.limit,
            remaining = window.remaining,
            reset_at = %window.reset_at,
            "rate limit window updated"
        );
        *self.window.write().await = Some(window);
    }

    /// How long a call issued now would have to wait.
    pub async fn wait_time(&self) -> Option<Duration> {
        let window = (*self.window.read().await)?;
        if !window.is_exhausted() {
            return None;
        }
        let now = self.clock.now();
        if now >= window.reset_at {
            return None;
        }
        (window.reset_at - now).to_std().ok()
    }

    /// Wait out an exhausted window before issuing a call.
    pub async fn acquire(&self) {
        if let Some(wait) = self.wait_time().await {
            warn!(
                sleep_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "reference API rate limit reached, sleeping until reset"
            );
            self.clock.sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::system::ManualClock;
    use crate::domain::ports::Clock;
    use chrono::{TimeZone, Utc};

    fn limiter() -> (RateLimiter, Arc<ManualClock>) {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        (RateLimiter::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_no_window_is_unthrottled() {
        let (limiter, clock) = limiter();
        limiter.acquire().await;
        assert!(clock.sleeps().is_empty());
        assert!(limiter.window().await.is_none());
    }

    #[tokio::test]
    async fn test_exhausted_window_waits_until_reset() {
        let (limiter, clock) = limiter();
        let reset_at = clock.now() + chrono::Duration::seconds(5);
        limiter
            .update(RateLimitWindow {
                limit: 60,
                remaining: 0,
                reset_at,
            })
            .await;

        limiter.acquire().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
        assert!(clock.now() >= reset_at);
    }

    #[tokio::test]
    async fn test_remaining_calls_do_not_wait() {
        let (limiter, clock) = limiter();
        limiter
            .update(RateLimitWindow {
                limit: 60,
                remaining: 12,
                reset_at: clock.now() + chrono::Duration::seconds(30),
            })
            .await;

        limiter.acquire().await;
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_past_reset_does_not_wait() {
        let (limiter, clock) = limiter();
        limiter
            .update(RateLimitWindow {
                limit: 60,
                remaining: 0,
                reset_at: clock.now() - chrono::Duration::seconds(1),
            })
            .await;

        assert!(limiter.wait_time().await.is_none());
        limiter.acquire().await;
        assert!(clock.sleeps().is_empty());
    }
}
