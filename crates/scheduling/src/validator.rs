//! Slot validation pipeline.

use chrono::{NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::error::Result;
use crate::grid::SlotGrid;
use crate::occupancy::{Booking, Occupancy};
use crate::slot::{Slot, parse_local};

/// Why a requested slot was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The timestamp could not be parsed.
    InvalidFormat,

    /// The date falls on the closed weekday.
    ClosedDay { weekday: Weekday },

    /// Off the grid, but in hours once snapped.
    Misaligned { grid_minutes: u32 },

    /// Outside the open/close window.
    OutsideHours { open_hour: u32, close_hour: u32 },

    /// Another booking holds the same grid cell.
    SlotTaken,
}

impl RejectReason {
    /// Stable machine-readable code, used as a metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::InvalidFormat => "invalid_format",
            RejectReason::ClosedDay { .. } => "closed_day",
            RejectReason::Misaligned { .. } => "misaligned",
            RejectReason::OutsideHours { .. } => "outside_hours",
            RejectReason::SlotTaken => "slot_taken",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::InvalidFormat => write!(f, "Invalid date/time format."),
            RejectReason::ClosedDay { weekday } => {
                write!(f, "Closed on {}s.", weekday_name(*weekday))
            }
            RejectReason::Misaligned { grid_minutes } => {
                write!(f, "Slots must align to {grid_minutes}-minute boundaries.")
            }
            RejectReason::OutsideHours {
                open_hour,
                close_hour,
            } => write!(
                f,
                "Outside business hours ({open_hour:02}:00–{close_hour:02}:00)."
            ),
            RejectReason::SlotTaken => write!(f, "Slot already taken."),
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Outcome of validating a requested pickup slot.
///
/// A rejection carries a suggestion for every reason except
/// [`RejectReason::InvalidFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Accepted {
        normalized_slot: Slot,
    },
    Rejected {
        reason: RejectReason,
        suggestion: Option<Slot>,
    },
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted { .. })
    }

    /// The accepted slot, if any.
    pub fn accepted_slot(&self) -> Option<Slot> {
        match self {
            ValidationResult::Accepted { normalized_slot } => Some(*normalized_slot),
            ValidationResult::Rejected { .. } => None,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            ValidationResult::Accepted { .. } => "accepted",
            ValidationResult::Rejected { reason, .. } => reason.code(),
        }
    }

    fn rejected(reason: RejectReason, suggestion: Option<Slot>) -> Self {
        ValidationResult::Rejected { reason, suggestion }
    }
}

/// Combines parsing, grid, hours, day and occupancy checks into one decision.
#[derive(Debug, Clone, Default)]
pub struct SlotValidator {
    grid: SlotGrid,
}

impl SlotValidator {
    pub fn new(grid: SlotGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Validates a requested pickup string against the rules and bookings.
    ///
    /// Errors only when a suggestion search is exhausted; every business
    /// rejection is an `Ok(ValidationResult::Rejected { .. })`.
    #[tracing::instrument(skip(self, bookings))]
    pub fn validate<I>(&self, bookings: I, requested: &str) -> Result<ValidationResult>
    where
        I: IntoIterator,
        I::Item: Booking,
    {
        match parse_local(requested) {
            Some(instant) => self.validate_instant(bookings, instant),
            None => Ok(record(ValidationResult::rejected(
                RejectReason::InvalidFormat,
                None,
            ))),
        }
    }

    /// Validates an already parsed instant.
    pub fn validate_instant<I>(
        &self,
        bookings: I,
        requested: NaiveDateTime,
    ) -> Result<ValidationResult>
    where
        I: IntoIterator,
        I::Item: Booking,
    {
        let grid = &self.grid;
        let rules = grid.rules();

        if grid.is_closed_day(requested) {
            let suggestion = grid.next_open_slot_after(requested)?;
            return Ok(record(ValidationResult::rejected(
                RejectReason::ClosedDay {
                    weekday: rules.closed_weekday,
                },
                Some(suggestion),
            )));
        }

        let aligned = grid.is_aligned(requested);
        let snapped = grid.round_down(requested);

        if !grid.is_within_business_hours(requested) {
            if !aligned && grid.is_within_business_hours(snapped) {
                return Ok(record(ValidationResult::rejected(
                    RejectReason::Misaligned {
                        grid_minutes: rules.grid_minutes,
                    },
                    grid.to_slot(snapped),
                )));
            }
            let suggestion = grid.next_open_slot_after(requested)?;
            return Ok(record(ValidationResult::rejected(
                RejectReason::OutsideHours {
                    open_hour: rules.open_hour,
                    close_hour: rules.close_hour,
                },
                Some(suggestion),
            )));
        }

        let occupancy = Occupancy::new(grid, bookings);
        if occupancy.has_conflict(snapped) {
            let suggestion = occupancy.next_free_slot(snapped)?;
            return Ok(record(ValidationResult::rejected(
                RejectReason::SlotTaken,
                Some(suggestion),
            )));
        }

        let normalized = if aligned { requested } else { snapped };
        Ok(record(ValidationResult::Accepted {
            normalized_slot: Slot::new_unchecked(normalized),
        }))
    }

    /// Checks a requested delivery time against an accepted pickup.
    ///
    /// The delivery must parse, sit on the grid and start at least one grid
    /// step after the pickup. Business hours are not enforced for deliveries.
    pub fn delivery_after(&self, pickup: Slot, requested: &str) -> Option<Slot> {
        let instant = parse_local(requested)?;
        let earliest = self.grid.add_steps(pickup.as_datetime(), 1)?;
        (self.grid.is_aligned(instant) && instant >= earliest)
            .then(|| Slot::new_unchecked(instant))
    }

    /// Every free in-hours slot of `date`, in chronological order.
    ///
    /// A closed day yields an empty list.
    pub fn list_available_slots<I>(&self, bookings: I, date: NaiveDate) -> Vec<Slot>
    where
        I: IntoIterator,
        I::Item: Booking,
    {
        let grid = &self.grid;
        if grid.is_closed_date(date) {
            return Vec::new();
        }
        let Some(mut cursor) = grid.opening_of(date) else {
            return Vec::new();
        };

        let occupancy = Occupancy::new(grid, bookings);
        let mut slots = Vec::new();
        while cursor.date() == date && cursor.hour() < grid.rules().close_hour {
            if grid.is_within_business_hours(cursor) && !occupancy.has_conflict(cursor) {
                slots.push(Slot::new_unchecked(cursor));
            }
            match grid.add_steps(cursor, 1) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        slots
    }
}

fn record(result: ValidationResult) -> ValidationResult {
    metrics::counter!("slot_validations_total", "outcome" => result.outcome()).increment(1);
    if let ValidationResult::Rejected { reason, suggestion } = &result {
        tracing::debug!(
            reason = reason.code(),
            suggestion = ?suggestion,
            "slot rejected"
        );
    }
    result
}
