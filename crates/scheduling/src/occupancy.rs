//! Occupancy checks against existing bookings.
//!
//! Capacity is one booking per grid cell, globally. Both the candidate and
//! every existing pickup are snapped to the grid before comparison, so two
//! requests inside the same cell always collide.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::SlotGrid;
use crate::slot::{Slot, parse_local};

/// Anything that occupies a pickup slot.
pub trait Booking {
    /// Pickup instant, or `None` when the stored value cannot be read.
    fn pickup_instant(&self) -> Option<NaiveDateTime>;
}

impl Booking for NaiveDateTime {
    fn pickup_instant(&self) -> Option<NaiveDateTime> {
        Some(*self)
    }
}

impl Booking for Slot {
    fn pickup_instant(&self) -> Option<NaiveDateTime> {
        Some(self.as_datetime())
    }
}

impl<B: Booking + ?Sized> Booking for &B {
    fn pickup_instant(&self) -> Option<NaiveDateTime> {
        (**self).pickup_instant()
    }
}

/// A booking row as held by an external table, timestamps still raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: String,
    pub pickup_slot: String,
    pub delivery_slot: String,
}

impl BookingRecord {
    pub fn new(
        id: impl Into<String>,
        pickup_slot: impl Into<String>,
        delivery_slot: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            pickup_slot: pickup_slot.into(),
            delivery_slot: delivery_slot.into(),
        }
    }
}

impl Booking for BookingRecord {
    fn pickup_instant(&self) -> Option<NaiveDateTime> {
        parse_local(&self.pickup_slot)
    }
}

/// Snapped pickup cells taken by a set of bookings.
#[derive(Debug, Clone)]
pub struct Occupancy<'g> {
    grid: &'g SlotGrid,
    taken: HashSet<NaiveDateTime>,
}

impl<'g> Occupancy<'g> {
    /// Builds the occupancy map, skipping bookings whose pickup is unreadable.
    pub fn new<I>(grid: &'g SlotGrid, bookings: I) -> Self
    where
        I: IntoIterator,
        I::Item: Booking,
    {
        let mut skipped = 0usize;
        let taken = bookings
            .into_iter()
            .filter_map(|booking| {
                let instant = booking.pickup_instant();
                if instant.is_none() {
                    skipped += 1;
                }
                instant
            })
            .map(|instant| grid.round_down(instant))
            .collect();

        if skipped > 0 {
            tracing::warn!(skipped, "ignored bookings with unreadable pickup slots");
        }

        Self { grid, taken }
    }

    /// Number of distinct occupied grid cells.
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }

    /// True iff the candidate's grid cell is already taken.
    pub fn has_conflict(&self, candidate: NaiveDateTime) -> bool {
        self.taken.contains(&self.grid.round_down(candidate))
    }

    /// Nearest unoccupied open slot strictly after `from`.
    ///
    /// Walks forward one grid step at a time, re-entering
    /// [`SlotGrid::next_open_slot_after`] whenever a step leaves business
    /// hours or lands on the closed day.
    pub fn next_free_slot(&self, from: NaiveDateTime) -> Result<Slot> {
        let horizon = self.grid.horizon(from);
        let mut cursor = self.grid.next_open_slot_after(from)?;

        loop {
            if cursor.as_datetime() > horizon {
                return Err(self.grid.exhausted(from));
            }
            if !self.has_conflict(cursor.as_datetime()) {
                return Ok(cursor);
            }

            let stepped = self
                .grid
                .add_steps(cursor.as_datetime(), 1)
                .ok_or_else(|| self.grid.exhausted(from))?;
            cursor = match self.grid.to_slot(stepped) {
                Some(slot) => slot,
                None => self.grid.next_open_slot_after(stepped)?,
            };
        }
    }
}

/// True iff any booking occupies the candidate's grid cell.
pub fn has_conflict<I>(grid: &SlotGrid, bookings: I, candidate: NaiveDateTime) -> bool
where
    I: IntoIterator,
    I::Item: Booking,
{
    let cell = grid.round_down(candidate);
    bookings
        .into_iter()
        .filter_map(|booking| booking.pickup_instant())
        .any(|instant| grid.round_down(instant) == cell)
}

/// Nearest unoccupied open slot strictly after `from`.
pub fn next_free_slot<I>(grid: &SlotGrid, bookings: I, from: NaiveDateTime) -> Result<Slot>
where
    I: IntoIterator,
    I::Item: Booking,
{
    Occupancy::new(grid, bookings).next_free_slot(from)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};

    use super::*;
    use crate::config::SlotRules;
    use crate::error::SchedulingError;

    fn at(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_conflict_on_same_cell() {
        let grid = SlotGrid::default();
        let bookings = vec![at(8, 9, 0)];
        assert!(has_conflict(&grid, &bookings, at(8, 9, 0)));
        assert!(has_conflict(&grid, &bookings, at(8, 9, 14)));
        assert!(!has_conflict(&grid, &bookings, at(8, 9, 15)));
    }

    #[test]
    fn test_existing_booking_is_snapped_too() {
        let grid = SlotGrid::default();
        let bookings = vec![at(8, 9, 7) + TimeDelta::seconds(30)];
        assert!(has_conflict(&grid, &bookings, at(8, 9, 0)));
        assert!(Occupancy::new(&grid, &bookings).has_conflict(at(8, 9, 0)));
    }

    #[test]
    fn test_unreadable_bookings_are_ignored() {
        let grid = SlotGrid::default();
        let bookings = vec![
            BookingRecord::new("1", "garbage", "2025-09-08T15:00"),
            BookingRecord::new("2", "2025-09-08T09:30", "2025-09-08T15:00"),
        ];
        let occupancy = Occupancy::new(&grid, &bookings);
        assert_eq!(occupancy.len(), 1);
        assert!(!occupancy.has_conflict(at(8, 9, 0)));
        assert!(occupancy.has_conflict(at(8, 9, 30)));
        assert!(!has_conflict(&grid, &bookings, at(8, 9, 0)));
    }

    #[test]
    fn test_next_free_slot_skips_taken_cells() {
        let grid = SlotGrid::default();
        let bookings = vec![at(8, 9, 15), at(8, 9, 30)];
        let next = next_free_slot(&grid, &bookings, at(8, 9, 0)).unwrap();
        assert_eq!(next.as_datetime(), at(8, 9, 45));
    }

    #[test]
    fn test_next_free_slot_rolls_past_close_and_closed_day() {
        let grid = SlotGrid::default();
        // Tuesday 15:45 taken: the next slot is Thursday opening.
        let bookings = vec![at(9, 15, 45)];
        let next = next_free_slot(&grid, &bookings, at(9, 15, 30)).unwrap();
        assert_eq!(next.as_datetime(), at(11, 9, 0));
    }

    #[test]
    fn test_next_free_slot_with_full_day() {
        let grid = SlotGrid::default();
        let mut bookings = Vec::new();
        let mut t = at(11, 9, 0);
        while t < at(11, 16, 0) {
            bookings.push(t);
            t += TimeDelta::minutes(15);
        }
        let next = next_free_slot(&grid, &bookings, at(11, 8, 0)).unwrap();
        assert_eq!(next.as_datetime(), at(12, 9, 0));
    }

    #[test]
    fn test_next_free_slot_exhausts_when_everything_taken() {
        let grid = SlotGrid::new(SlotRules {
            search_limit: 96 * 2,
            ..SlotRules::default()
        })
        .unwrap();
        let mut bookings = Vec::new();
        let mut t = at(8, 0, 0);
        while t < at(13, 0, 0) {
            bookings.push(t);
            t += TimeDelta::minutes(15);
        }
        let err = next_free_slot(&grid, &bookings, at(8, 9, 0)).unwrap_err();
        assert!(matches!(err, SchedulingError::SearchExhausted { .. }));
    }
}
