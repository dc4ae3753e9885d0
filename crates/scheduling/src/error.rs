//! Scheduling error types.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised by the scheduler.
///
/// Business rejections (closed day, occupied slot, ...) are not errors; they
/// are reported through [`crate::ValidationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    /// The bounded forward scan found no usable slot.
    #[error("No open slot within {limit} grid steps after {from}")]
    SearchExhausted { from: NaiveDateTime, limit: usize },

    /// The configured rules cannot describe a usable grid.
    #[error("Invalid slot rules: {0}")]
    InvalidRules(String),
}

/// Result type for scheduling operations.
pub type Result<T> = std::result::Result<T, SchedulingError>;
