//! Slot rules loaded from environment variables.

use std::str::FromStr;

use chrono::Weekday;

use crate::error::{Result, SchedulingError};

/// Business rules for the appointment grid, with sensible defaults.
///
/// Reads from environment variables:
/// - `SLOT_GRID_MINUTES`: grid step in minutes (default: `15`)
/// - `SLOT_OPEN_HOUR`: first hour a slot may start (default: `9`)
/// - `SLOT_CLOSE_HOUR`: exclusive closing hour (default: `16`, last start `15:45`)
/// - `SLOT_CLOSED_WEEKDAY`: weekday with no slots at all (default: `Wed`)
/// - `SLOT_SEARCH_LIMIT`: forward search horizon in grid steps (default: `1344`, two weeks)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRules {
    pub grid_minutes: u32,
    pub open_hour: u32,
    pub close_hour: u32,
    pub closed_weekday: Weekday,
    pub search_limit: usize,
}

impl SlotRules {
    /// Loads rules from environment variables, falling back to defaults for
    /// missing or unparsable values, then validates the combination.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let rules = Self {
            grid_minutes: env_or("SLOT_GRID_MINUTES", defaults.grid_minutes),
            open_hour: env_or("SLOT_OPEN_HOUR", defaults.open_hour),
            close_hour: env_or("SLOT_CLOSE_HOUR", defaults.close_hour),
            closed_weekday: env_or("SLOT_CLOSED_WEEKDAY", defaults.closed_weekday),
            search_limit: env_or("SLOT_SEARCH_LIMIT", defaults.search_limit),
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Checks that the rules describe a usable grid.
    pub fn validate(&self) -> Result<()> {
        if self.grid_minutes == 0 || 60 % self.grid_minutes != 0 {
            return Err(SchedulingError::InvalidRules(format!(
                "grid step {} must be a non-zero divisor of 60",
                self.grid_minutes
            )));
        }
        if self.open_hour >= self.close_hour || self.close_hour > 24 {
            return Err(SchedulingError::InvalidRules(format!(
                "business hours {}..{} are not a valid window",
                self.open_hour, self.close_hour
            )));
        }
        if self.search_limit == 0 {
            return Err(SchedulingError::InvalidRules(
                "search limit must be at least one grid step".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of grid steps in one calendar day.
    pub fn steps_per_day(&self) -> usize {
        (24 * 60 / self.grid_minutes) as usize
    }
}

impl Default for SlotRules {
    fn default() -> Self {
        Self {
            grid_minutes: 15,
            open_hour: 9,
            close_hour: 16,
            closed_weekday: Weekday::Wed,
            search_limit: 96 * 14,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
