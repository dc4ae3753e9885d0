//! HTTP route handlers.

pub mod customers;
pub mod orders;
pub mod payments;
pub mod slots;
pub mod system;
