//! Pure time arithmetic on the appointment grid.
//!
//! Nothing in here knows about bookings: these functions only answer whether
//! an instant is a usable slot start and where the next one is.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::config::SlotRules;
use crate::error::{Result, SchedulingError};
use crate::slot::Slot;

/// Offsets an instant by an arbitrary number of minutes.
///
/// Returns `None` when the result would leave chrono's representable range.
pub fn add_minutes(instant: NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    TimeDelta::try_minutes(minutes).and_then(|delta| instant.checked_add_signed(delta))
}

/// The appointment grid: step, business hours and the closed weekday.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    rules: SlotRules,
}

impl SlotGrid {
    /// Creates a grid after validating the rules.
    pub fn new(rules: SlotRules) -> Result<Self> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &SlotRules {
        &self.rules
    }

    /// True iff the instant falls on the closed weekday.
    pub fn is_closed_day(&self, instant: NaiveDateTime) -> bool {
        self.is_closed_date(instant.date())
    }

    pub fn is_closed_date(&self, date: NaiveDate) -> bool {
        date.weekday() == self.rules.closed_weekday
    }

    /// True iff minutes sit on the grid and seconds/sub-seconds are zero.
    pub fn is_aligned(&self, instant: NaiveDateTime) -> bool {
        instant.minute() % self.rules.grid_minutes == 0
            && instant.second() == 0
            && instant.nanosecond() == 0
    }

    /// Latest grid instant not after `instant`, with seconds zeroed.
    pub fn round_down(&self, instant: NaiveDateTime) -> NaiveDateTime {
        let minute = instant.minute() - instant.minute() % self.rules.grid_minutes;
        // Never later than `instant`, so the addition cannot overflow.
        instant.date().and_time(NaiveTime::MIN)
            + TimeDelta::hours(i64::from(instant.hour()))
            + TimeDelta::minutes(i64::from(minute))
    }

    /// True iff the hour is in `[open, close)` and the instant is aligned.
    pub fn is_within_business_hours(&self, instant: NaiveDateTime) -> bool {
        let hour = instant.hour();
        hour >= self.rules.open_hour && hour < self.rules.close_hour && self.is_aligned(instant)
    }

    /// True iff the instant is a bookable slot start ignoring occupancy.
    pub fn is_open_slot(&self, instant: NaiveDateTime) -> bool {
        !self.is_closed_day(instant) && self.is_within_business_hours(instant)
    }

    /// Offsets an instant by `steps` grid steps (negative steps move back).
    pub fn add_steps(&self, instant: NaiveDateTime, steps: i64) -> Option<NaiveDateTime> {
        steps
            .checked_mul(i64::from(self.rules.grid_minutes))
            .and_then(|minutes| add_minutes(instant, minutes))
    }

    /// Opening time on the given calendar day.
    pub fn opening_of(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        date.and_time(NaiveTime::MIN)
            .checked_add_signed(TimeDelta::hours(i64::from(self.rules.open_hour)))
    }

    /// Wraps an instant already known to be an open slot.
    pub fn to_slot(&self, instant: NaiveDateTime) -> Option<Slot> {
        self.is_open_slot(instant).then(|| Slot::new_unchecked(instant))
    }

    /// Earliest open slot strictly later than `instant`.
    ///
    /// Rounds down, adds one step, then skips to the next opening whenever the
    /// cursor sits before opening, at/after closing, or on the closed weekday.
    /// Fails with [`SchedulingError::SearchExhausted`] once the cursor passes
    /// the configured horizon.
    pub fn next_open_slot_after(&self, instant: NaiveDateTime) -> Result<Slot> {
        let horizon = self.horizon(instant);
        let mut cursor = self
            .add_steps(self.round_down(instant), 1)
            .ok_or_else(|| self.exhausted(instant))?;

        while cursor <= horizon {
            let next = if self.is_closed_day(cursor) || cursor.hour() >= self.rules.close_hour {
                cursor
                    .date()
                    .succ_opt()
                    .and_then(|date| self.opening_of(date))
            } else if cursor.hour() < self.rules.open_hour {
                self.opening_of(cursor.date())
            } else {
                return Ok(Slot::new_unchecked(cursor));
            };
            cursor = next.ok_or_else(|| self.exhausted(instant))?;
        }

        Err(self.exhausted(instant))
    }

    /// Last instant a forward search starting at `from` may visit.
    ///
    /// Saturates at the end of chrono's range for very large limits.
    pub(crate) fn horizon(&self, from: NaiveDateTime) -> NaiveDateTime {
        let steps = i64::try_from(self.rules.search_limit).unwrap_or(i64::MAX);
        self.add_steps(from, steps).unwrap_or(NaiveDateTime::MAX)
    }

    pub(crate) fn exhausted(&self, from: NaiveDateTime) -> SchedulingError {
        metrics::counter!("slot_search_exhausted_total").increment(1);
        tracing::error!(%from, limit = self.rules.search_limit, "slot search exhausted");
        SchedulingError::SearchExhausted {
            from,
            limit: self.rules.search_limit,
        }
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            rules: SlotRules::default(),
        }
    }
}
