//! Slot scheduling for the pickup appointment grid.
//!
//! This crate provides:
//! - `SlotRules` / `SlotGrid`: grid step, business hours and the closed weekday
//! - `Occupancy`: conflict detection against existing bookings (capacity 1 per slot)
//! - `SlotValidator`: the single validation pipeline producing an accepted
//!   slot or a typed rejection with a suggestion

pub mod config;
pub mod error;
pub mod grid;
pub mod occupancy;
pub mod slot;
pub mod validator;

pub use config::SlotRules;
pub use error::{Result, SchedulingError};
pub use grid::{SlotGrid, add_minutes};
pub use occupancy::{Booking, BookingRecord, Occupancy, has_conflict, next_free_slot};
pub use slot::{SLOT_FORMAT, Slot, format_local, parse_local};
pub use validator::{RejectReason, SlotValidator, ValidationResult};
