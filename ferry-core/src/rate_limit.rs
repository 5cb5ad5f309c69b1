//! Rate-limit guard for metered APIs
//!
//! The hosting API hands out a fixed budget of requests that resets at a known
//! time. Jobs call [`RateLimitGuard::guard`] after every unit of work; when the
//! remaining budget drops below the guard's threshold the job sleeps until the
//! reset time plus a safety margin.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Clock;

/// Snapshot of the remaining request budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    /// Requests left in the current window
    pub remaining: u64,
    /// When the window resets
    pub reset: DateTime<Utc>,
}

/// Anything that can report the current rate-limit state
#[async_trait]
pub trait RateLimitSource: Send + Sync {
    /// Error returned when the status query fails
    type Error: Send;

    /// Query the current state; not retried by the guard
    async fn rate_limit(&self) -> Result<RateLimitState, Self::Error>;
}

/// Sleeps when the remaining budget falls below a low-water mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitGuard {
    threshold: u64,
    margin: Duration,
}

impl RateLimitGuard {
    /// Guard that pauses below `threshold` remaining requests, waking `margin` after reset
    pub const fn new(threshold: u64, margin: Duration) -> Self {
        Self { threshold, margin }
    }

    /// One label creation costs two requests at most
    pub const fn label_population() -> Self {
        Self::new(10, Duration::from_secs(5))
    }

    /// One issue costs a search lookup, comment fetch, model call and label write
    pub const fn labeling() -> Self {
        Self::new(20, Duration::from_secs(15))
    }

    /// One issue may replay many comments
    pub const fn issue_population() -> Self {
        Self::new(50, Duration::from_secs(10))
    }

    /// One scraped item costs a detail fetch plus its sub-listings
    pub const fn scraping() -> Self {
        Self::new(50, Duration::from_secs(10))
    }

    /// How long to pause for `state` at time `now`, if at all
    pub fn pause_for(&self, state: &RateLimitState, now: DateTime<Utc>) -> Option<Duration> {
        if state.remaining >= self.threshold {
            return None;
        }

        let margin =
            chrono::Duration::from_std(self.margin).unwrap_or_else(|_| chrono::Duration::zero());
        let wait = state.reset - now + margin;

        // to_std fails for negative spans: the reset already passed
        wait.to_std().ok().filter(|d| !d.is_zero())
    }

    /// Check the budget and sleep if it is running low
    ///
    /// Returns the duration slept, if any. A failed status query is returned
    /// to the caller as-is.
    pub async fn guard<S>(&self, source: &S, clock: &dyn Clock) -> Result<Option<Duration>, S::Error>
    where
        S: RateLimitSource + ?Sized,
    {
        let state = source.rate_limit().await?;
        debug!(
            remaining = state.remaining,
            threshold = self.threshold,
            reset = %state.reset,
            "Checked rate limit"
        );

        let pause = self.pause_for(&state, clock.now());
        if let Some(duration) = pause {
            info!(
                remaining = state.remaining,
                reset = %state.reset,
                sleep_secs = duration.as_secs_f64(),
                "Rate limit almost reached, sleeping"
            );
            clock.sleep(duration).await;
        }

        Ok(pause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    struct FixedSource(Result<RateLimitState, String>);

    #[async_trait]
    impl RateLimitSource for FixedSource {
        type Error = String;

        async fn rate_limit(&self) -> Result<RateLimitState, String> {
            self.0.clone()
        }
    }

    fn state(remaining: u64, reset: DateTime<Utc>) -> RateLimitState {
        RateLimitState { remaining, reset }
    }

    #[tokio::test]
    async fn test_sleeps_until_reset_plus_margin() {
        let clock = ManualClock::default();
        let source = FixedSource(Ok(state(5, clock.now() + chrono::Duration::seconds(10))));
        let guard = RateLimitGuard::new(20, Duration::from_secs(15));

        let slept = guard.guard(&source, &clock).await.unwrap();

        assert_eq!(slept, Some(Duration::from_secs(25)));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(25)]);
    }

    #[tokio::test]
    async fn test_no_sleep_above_threshold() {
        let clock = ManualClock::default();
        let source = FixedSource(Ok(state(25, clock.now() + chrono::Duration::seconds(10))));
        let guard = RateLimitGuard::new(20, Duration::from_secs(15));

        assert_eq!(guard.guard(&source, &clock).await.unwrap(), None);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let now = Utc::now();
        let guard = RateLimitGuard::labeling();
        assert!(guard
            .pause_for(&state(20, now + chrono::Duration::seconds(60)), now)
            .is_none());
        assert!(guard
            .pause_for(&state(19, now + chrono::Duration::seconds(60)), now)
            .is_some());
    }

    #[test]
    fn test_reset_long_past_means_no_sleep() {
        let now = Utc::now();
        let guard = RateLimitGuard::label_population();
        let stale = state(0, now - chrono::Duration::seconds(60));
        assert!(guard.pause_for(&stale, now).is_none());
    }

    #[test]
    fn test_recent_reset_still_waits_for_margin() {
        let now = Utc::now();
        let guard = RateLimitGuard::issue_population();
        let just_reset = state(0, now - chrono::Duration::seconds(4));
        assert_eq!(
            guard.pause_for(&just_reset, now),
            Some(Duration::from_secs(6))
        );
    }

    #[test]
    fn test_scraping_preset() {
        let now = Utc::now();
        let guard = RateLimitGuard::scraping();
        assert!(guard
            .pause_for(&state(50, now + chrono::Duration::seconds(30)), now)
            .is_none());
        assert_eq!(
            guard.pause_for(&state(49, now + chrono::Duration::seconds(30)), now),
            Some(Duration::from_secs(40))
        );
    }

    #[tokio::test]
    async fn test_query_failure_propagates() {
        let clock = ManualClock::default();
        let source = FixedSource(Err("rate limit endpoint unavailable".to_string()));

        let err = RateLimitGuard::labeling()
            .guard(&source, &clock)
            .await
            .unwrap_err();

        assert!(err.contains("unavailable"));
        assert!(clock.sleeps().is_empty());
    }
}
