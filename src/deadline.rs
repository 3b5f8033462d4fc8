//! # Deadline Tracking
//!
//! Converts a job's absolute deadline (epoch milliseconds) into the time budget
//! of a single attempt. The arithmetic is a pure function of the deadline and
//! the current time; the current time comes from a [`Clock`] so tests can pin it.
//!
//! ```rust
//! use loadtask_core::deadline::DeadlineTracker;
//!
//! let tracker = DeadlineTracker::new(10_500);
//! assert_eq!(tracker.remaining_seconds_at(0), 10);
//! assert!(tracker.attempt_budget_at(10_000).is_none());
//! ```

use chrono::Utc;
use std::fmt;
use std::time::Duration;

/// Source of wall-clock time in epoch milliseconds
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_millis(&self) -> i64;
}

/// Wall clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Time budget granted to one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget {
    pub remaining_ms: i64,
    /// Whole seconds left, always at least one
    pub timeout_seconds: u64,
}

impl AttemptBudget {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineTracker {
    deadline_ms: i64,
}

impl DeadlineTracker {
    pub fn new(deadline_ms: i64) -> Self {
        Self { deadline_ms }
    }

    pub fn deadline_ms(&self) -> i64 {
        self.deadline_ms
    }

    pub fn remaining_ms_at(&self, now_ms: i64) -> i64 {
        self.deadline_ms.saturating_sub(now_ms)
    }

    /// `floor((deadline - now) / 1000)`
    pub fn remaining_seconds_at(&self, now_ms: i64) -> i64 {
        self.remaining_ms_at(now_ms).div_euclid(1000)
    }

    /// Budget for an attempt starting at `now_ms`, or `None` once less than a
    /// whole second is left.
    pub fn attempt_budget_at(&self, now_ms: i64) -> Option<AttemptBudget> {
        let seconds = self.remaining_seconds_at(now_ms);
        if seconds <= 0 {
            return None;
        }
        Some(AttemptBudget {
            remaining_ms: self.remaining_ms_at(now_ms),
            timeout_seconds: seconds as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_seconds_floors() {
        let tracker = DeadlineTracker::new(20_999);
        assert_eq!(tracker.remaining_seconds_at(10_000), 10);
        assert_eq!(tracker.remaining_seconds_at(19_001), 1);
        assert_eq!(tracker.remaining_seconds_at(20_000), 0);
    }

    #[test]
    fn test_remaining_seconds_negative_after_deadline() {
        let tracker = DeadlineTracker::new(1_000);
        assert_eq!(tracker.remaining_ms_at(1_500), -500);
        assert_eq!(tracker.remaining_seconds_at(1_500), -1);
    }

    #[test]
    fn test_attempt_budget_requires_a_whole_second() {
        let tracker = DeadlineTracker::new(5_000);
        let budget = tracker.attempt_budget_at(0).unwrap();
        assert_eq!(budget.timeout_seconds, 5);
        assert_eq!(budget.remaining_ms, 5_000);
        assert_eq!(budget.timeout(), Duration::from_secs(5));

        assert!(tracker.attempt_budget_at(4_001).is_none());
        assert!(tracker.attempt_budget_at(5_000).is_none());
        assert!(tracker.attempt_budget_at(9_000).is_none());
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let tracker = DeadlineTracker::new(i64::MIN);
        assert_eq!(tracker.remaining_ms_at(i64::MAX), i64::MIN);
        assert!(tracker.attempt_budget_at(i64::MAX).is_none());
    }

    #[test]
    fn test_system_clock_is_close_to_chrono_now() {
        let now = Utc::now().timestamp_millis();
        let clock = SystemClock;
        assert!((clock.now_millis() - now).abs() < 5_000);
    }
}
