//! Integration tests for renewal scheduling and retry delays.
//!
//! The delay functions are pure, so these tests pin the random source
//! with a seeded `StdRng` instead of touching timers.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use veritas_backoff::{
    DEFAULT_REFRESH_THRESHOLD, RateLimitHint, RetryPolicy, refresh_delay, unix_millis_now,
};

// =========================================================================
// refresh_delay
// =========================================================================

#[test]
fn test_refresh_delay_subtracts_threshold() {
    let now = 1_700_000_000_000;
    let expires_at = 1_700_000_000 + 120;
    assert_eq!(
        refresh_delay(expires_at, now, DEFAULT_REFRESH_THRESHOLD),
        Duration::from_secs(60)
    );
}

#[test]
fn test_refresh_delay_keeps_millisecond_precision() {
    // now is 250 ms past a whole second; the session expires in ~1 hour.
    let now = 1_700_000_000_250;
    let expires_at = 1_700_003_600;
    assert_eq!(
        refresh_delay(expires_at, now, DEFAULT_REFRESH_THRESHOLD),
        Duration::from_millis(3_540_000 - 250)
    );
}

#[test]
fn test_refresh_delay_is_zero_within_threshold() {
    let now = 1_700_000_000_000;
    for secs_left in [0, 1, 30, 59, 60] {
        assert_eq!(
            refresh_delay(1_700_000_000 + secs_left, now, DEFAULT_REFRESH_THRESHOLD),
            Duration::ZERO,
            "{secs_left}s left must renew immediately"
        );
    }
}

#[test]
fn test_refresh_delay_is_zero_for_expired_sessions() {
    let now = 1_700_000_000_000;
    assert_eq!(
        refresh_delay(1_600_000_000, now, DEFAULT_REFRESH_THRESHOLD),
        Duration::ZERO
    );
    assert_eq!(refresh_delay(i64::MIN, now, DEFAULT_REFRESH_THRESHOLD), Duration::ZERO);
}

#[test]
fn test_unix_millis_now_is_after_2023() {
    assert!(unix_millis_now() > 1_672_531_200_000);
}

// =========================================================================
// next_delay
// =========================================================================

#[test]
fn test_next_delay_is_backoff_plus_bounded_jitter() {
    let policy = RetryPolicy::default();
    let mut rng = StdRng::seed_from_u64(7);

    for attempt in 1..5u32 {
        let expected_base = Duration::from_millis((1000u64 << attempt).min(30_000));
        for _ in 0..200 {
            let delay = policy.next_delay_with(attempt, None, &mut rng);
            assert!(delay >= expected_base, "attempt {attempt}: {delay:?}");
            assert!(
                delay < expected_base + Duration::from_secs(1),
                "attempt {attempt}: {delay:?}"
            );
        }
    }
}

#[test]
fn test_next_delay_jitter_actually_varies() {
    let policy = RetryPolicy::default();
    let mut rng = StdRng::seed_from_u64(42);
    let delays: std::collections::HashSet<Duration> = (0..50)
        .map(|_| policy.next_delay_with(2, None, &mut rng))
        .collect();
    assert!(delays.len() > 1, "jitter should desynchronize retries");
}

#[test]
fn test_next_delay_without_jitter_is_exact() {
    let policy = RetryPolicy::default().without_jitter();
    assert_eq!(policy.next_delay(3, None), Duration::from_secs(8));
    assert_eq!(policy.next_delay(10, None), Duration::from_secs(30));
}

#[test]
fn test_next_delay_rate_limit_uses_server_hint_verbatim() {
    let policy = RetryPolicy::default();
    let hint = Some(RateLimitHint(Some(Duration::from_secs(10))));
    // Attempt count is irrelevant and no jitter is added.
    for attempt in [0, 3, 9] {
        assert_eq!(policy.next_delay(attempt, hint), Duration::from_secs(10));
    }
}

#[test]
fn test_next_delay_rate_limit_without_hint_falls_back_to_a_minute() {
    let policy = RetryPolicy::default();
    assert_eq!(
        policy.next_delay(0, Some(RateLimitHint(None))),
        Duration::from_secs(60)
    );
}

#[test]
fn test_policy_deserializes_from_json_config() {
    let policy: RetryPolicy = serde_json::from_str(
        r#"{
            "max_attempts": 3,
            "initial_delay": {"secs": 0, "nanos": 500000000},
            "max_delay": {"secs": 10, "nanos": 0},
            "max_jitter": {"secs": 0, "nanos": 0},
            "rate_limit_fallback": {"secs": 30, "nanos": 0}
        }"#,
    )
    .unwrap();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.next_delay(1, None), Duration::from_secs(1));
}
