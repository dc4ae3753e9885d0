//! Booking orchestration: slot validation, payment and persistence as one flow.

mod commands;
mod service;

pub use commands::{CreateOrder, EditOrder};
pub use service::BookingService;
