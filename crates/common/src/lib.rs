//! Shared types used across the scheduling, domain and API crates.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{CustomerId, IdParseError, OrderId};
