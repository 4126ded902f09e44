//! Time source for everything that schedules or ages review data.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;
use tracing::warn;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Largest simulated offset, in either direction.
pub const MAX_OFFSET_DAYS: i64 = 36_500;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall-clock time shifted forward by a whole number of days.
///
/// The CLI persists the offset so "advance a day" survives restarts, which
/// lets a learner see cards come due without waiting.
#[derive(Debug, Clone, Copy)]
pub struct OffsetClock {
    days: i64,
}

impl OffsetClock {
    pub fn new(days: i64) -> Self {
        Self { days }
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn is_valid_offset(days: i64) -> bool {
        (-MAX_OFFSET_DAYS..=MAX_OFFSET_DAYS).contains(&days)
    }
}

impl Clock for OffsetClock {
    /// Falls back to wall-clock time if the offset is out of range.
    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        if !Self::is_valid_offset(self.days) {
            warn!(days = self.days, "clock offset out of range, ignoring it");
            return now;
        }
        Duration::try_days(self.days)
            .and_then(|offset| now.checked_add_signed(offset))
            .unwrap_or(now)
    }
}

/// A clock that only moves when told to. Used by tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = time;
        }
    }

    /// Moves the clock forward. Overflowing moves are ignored.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            if let Some(next) = now.checked_add_signed(by) {
                *now = next;
            }
        }
    }

    pub fn advance_days(&self, days: i64) {
        if let Some(by) = Duration::try_days(days) {
            self.advance(by);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Fractional days from `earlier` to `later`; negative if `later` is before.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance_days(3);
        assert_eq!(clock.now(), start + Duration::days(3));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_offset_clock_is_ahead_of_system_time() {
        let clock = OffsetClock::new(2);
        let diff = clock.now() - Utc::now();
        assert!(diff > Duration::days(1));
        assert_eq!(clock.days(), 2);
    }

    #[test]
    fn test_huge_offset_falls_back_to_system_time() {
        assert!(!OffsetClock::is_valid_offset(100_000_000));
        assert!(OffsetClock::is_valid_offset(-MAX_OFFSET_DAYS));

        let clock = OffsetClock::new(100_000_000);
        let diff = clock.now() - Utc::now();
        assert!(diff.num_seconds().abs() < 60);
    }

    #[test]
    fn test_manual_clock_ignores_overflowing_advance() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance_days(i64::MAX);
        clock.advance_days(1_000_000_000);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_days_between_is_fractional() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let later = start + Duration::hours(36);
        assert!((days_between(start, later) - 1.5).abs() < 1e-9);
        assert!(days_between(later, start) < 0.0);
    }
}
