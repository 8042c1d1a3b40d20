//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert hours to duration
pub fn hours_to_duration(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

/// Check whether something written at `stored_at` is still fresh at `now`
///
/// The bound is exclusive: an age exactly equal to `max_age` is stale.
/// A `stored_at` in the future (clock moved backwards) counts as age zero.
/// A `max_age` too large for chrono to represent never expires.
pub fn is_fresh(stored_at: DateTime<Utc>, max_age: Duration, now: DateTime<Utc>) -> bool {
    let age = now.signed_duration_since(stored_at);
    match chrono::Duration::from_std(max_age) {
        Ok(max_age) => age < max_age,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01 00:00:00 UTC
    }

    #[test]
    fn test_hours_to_duration() {
        assert_eq!(hours_to_duration(0), Duration::ZERO);
        assert_eq!(hours_to_duration(24), Duration::from_secs(86_400));
        // Saturates instead of overflowing
        assert_eq!(hours_to_duration(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_is_fresh_inside_window() {
        let stored = now();
        let later = stored + chrono::Duration::seconds(59);
        assert!(is_fresh(stored, Duration::from_secs(60), later));
    }

    #[test]
    fn test_is_fresh_boundary_is_stale() {
        let stored = now();
        let later = stored + chrono::Duration::seconds(60);
        assert!(!is_fresh(stored, Duration::from_secs(60), later));
    }

    #[test]
    fn test_is_fresh_past_window() {
        let stored = now();
        let later = stored + chrono::Duration::hours(25);
        assert!(!is_fresh(stored, hours_to_duration(24), later));
    }

    #[test]
    fn test_is_fresh_zero_max_age_always_stale() {
        let stored = now();
        assert!(!is_fresh(stored, Duration::ZERO, stored));
    }

    #[test]
    fn test_is_fresh_future_timestamp() {
        let now_ts = now();
        let future = now_ts + chrono::Duration::minutes(5);
        assert!(is_fresh(future, Duration::from_secs(1), now_ts));
    }

    #[test]
    fn test_is_fresh_huge_max_age_never_expires() {
        let stored = now() - chrono::Duration::days(365 * 50);
        assert!(is_fresh(stored, Duration::from_secs(u64::MAX), now()));
    }
}
