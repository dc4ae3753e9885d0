//! Time sources.
//!
//! Slots are local wall-clock values, audit timestamps are UTC. Services read
//! both from a [`Clock`] so edit and cancel cutoffs can be tested.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant for audit timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current local wall-clock time, comparable with slots.
    fn local_now(&self) -> NaiveDateTime;
}

/// The host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
///
/// The local wall-clock time and the UTC time are the same reading, which is
/// enough for tests that care about ordering rather than zones.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(local: NaiveDateTime) -> Self {
        Self {
            millis: AtomicI64::new(local.and_utc().timestamp_millis()),
        }
    }

    pub fn set(&self, local: NaiveDateTime) {
        self.millis
            .store(local.and_utc().timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.millis
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .unwrap_or_default()
    }

    fn local_now(&self) -> NaiveDateTime {
        self.now().naive_utc()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_manual_clock_moves_only_when_told() {
        let start = NaiveDate::from_ymd_opt(2025, 9, 8)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.local_now(), start);

        clock.advance(TimeDelta::minutes(90));
        assert_eq!(clock.local_now(), start + TimeDelta::minutes(90));

        clock.set(start);
        assert_eq!(clock.local_now(), start);
        assert_eq!(clock.now().naive_utc(), start);
    }
}
