//! Renewal scheduling and retry backoff for Veritas.
//!
//! Everything here is a pure function of its inputs (plus an injectable
//! random source), so the timing rules can be tested without timers,
//! tasks or network calls.
//!
//! - [`refresh_delay`]: how long to wait before renewing a session.
//! - [`RetryPolicy::next_delay`]: how long to wait before retrying a
//!   failed renewal: exponential backoff with jitter, or the server's
//!   rate-limit hint.
//!
//! # Jitter
//!
//! Every tab of the same origin runs its own synchronizer. Without jitter,
//! tabs that failed together would retry together. A random `0..max_jitter`
//! is added to every backoff delay to spread them out.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Default lead time before expiry at which a session is renewed.
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Renewal scheduling
// ---------------------------------------------------------------------------

/// Delay until a session expiring at `expires_at` (seconds since epoch)
/// should be renewed, given the current time in milliseconds.
///
/// `max(0, expires_at * 1000 - now - threshold)`. A session that already
/// expired, or expires within the threshold, yields `Duration::ZERO`.
pub fn refresh_delay(expires_at: i64, now_millis: i64, threshold: Duration) -> Duration {
    let threshold_ms = i64::try_from(threshold.as_millis()).unwrap_or(i64::MAX);
    let remaining = expires_at
        .saturating_mul(1000)
        .saturating_sub(now_millis)
        .saturating_sub(threshold_ms);
    u64::try_from(remaining).map_or(Duration::ZERO, Duration::from_millis)
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn unix_millis_now() -> i64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO);
    i64::try_from(since_epoch.as_millis()).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// The server's "retry after" hint accompanying a rate-limit rejection.
///
/// `RateLimitHint(None)` means the server rate-limited us without saying
/// for how long; [`RetryPolicy::rate_limit_fallback`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHint(pub Option<Duration>);

/// Bounded exponential backoff with jitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Consecutive failures after which renewal gives up.
    pub max_attempts: u32,
    /// Base delay; doubled for every consecutive failure.
    pub initial_delay: Duration,
    /// Ceiling for the exponential part of the delay.
    pub max_delay: Duration,
    /// Upper bound (exclusive) of the random jitter added to backoff delays.
    pub max_jitter: Duration,
    /// Wait used when a rate-limit response carries no retry-after hint.
    pub rate_limit_fallback: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_secs(1),
            rate_limit_fallback: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Clamp and fix any out-of-range values so the policy is safe to use.
    ///
    /// - `max_attempts` is at least 1.
    /// - `initial_delay` is forced ≤ `max_delay`.
    pub fn validated(mut self) -> Self {
        if self.max_attempts == 0 {
            warn!("max_attempts of 0 would never retry, using 1");
            self.max_attempts = 1;
        }
        if self.initial_delay > self.max_delay {
            warn!(
                initial_ms = self.initial_delay.as_millis() as u64,
                max_ms = self.max_delay.as_millis() as u64,
                "initial_delay exceeds max_delay, clamping"
            );
            self.initial_delay = self.max_delay;
        }
        self
    }

    /// A policy with no jitter, for deterministic schedules.
    pub fn without_jitter(self) -> Self {
        Self {
            max_jitter: Duration::ZERO,
            ..self
        }
    }

    /// Whether `attempt_count` consecutive failures exhaust the budget.
    pub fn is_exhausted(&self, attempt_count: u32) -> bool {
        attempt_count >= self.max_attempts
    }

    /// The exponential part of the delay: `min(initial * 2^attempt, max)`.
    pub fn backoff(&self, attempt_count: u32) -> Duration {
        2u32.checked_pow(attempt_count)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Delay before the next retry, using the thread-local RNG for jitter.
    ///
    /// With a rate-limit hint, the server's delay (or the fallback) is
    /// used verbatim. Otherwise the delay is [`backoff`](Self::backoff)
    /// plus jitter in `[0, max_jitter)`.
    pub fn next_delay(&self, attempt_count: u32, rate_limit: Option<RateLimitHint>) -> Duration {
        self.next_delay_with(attempt_count, rate_limit, &mut rand::rng())
    }

    /// [`next_delay`](Self::next_delay) with an explicit random source.
    pub fn next_delay_with<R: Rng + ?Sized>(
        &self,
        attempt_count: u32,
        rate_limit: Option<RateLimitHint>,
        rng: &mut R,
    ) -> Duration {
        if let Some(RateLimitHint(hint)) = rate_limit {
            let delay = hint.unwrap_or(self.rate_limit_fallback);
            trace!(delay_ms = delay.as_millis() as u64, "rate-limit delay");
            return delay;
        }

        let base = self.backoff(attempt_count);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(rng.random_range(0..jitter_ms))
        } else {
            Duration::ZERO
        };
        trace!(
            attempt_count,
            base_ms = base.as_millis() as u64,
            jitter_ms = jitter.as_millis() as u64,
            "backoff delay"
        );
        base + jitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_until_ceiling() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff(0), Duration::from_secs(1));
        assert_eq!(p.backoff(1), Duration::from_secs(2));
        assert_eq!(p.backoff(4), Duration::from_secs(16));
        assert_eq!(p.backoff(5), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_huge_attempt_saturates_to_ceiling() {
        assert_eq!(RetryPolicy::default().backoff(200), Duration::from_secs(30));
    }

    #[test]
    fn test_validated_fixes_zero_attempts_and_inverted_delays() {
        let p = RetryPolicy {
            max_attempts: 0,
            initial_delay: Duration::from_secs(90),
            ..RetryPolicy::default()
        }
        .validated();
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.initial_delay, p.max_delay);
    }

    #[test]
    fn test_is_exhausted_at_max_attempts() {
        let p = RetryPolicy::default();
        assert!(!p.is_exhausted(4));
        assert!(p.is_exhausted(5));
    }
}
