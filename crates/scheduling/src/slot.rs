//! Slot values and the local wall-clock wire format.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Wire format for slots: local wall-clock, minute precision, no offset.
pub const SLOT_FORMAT: &str = "%Y-%m-%dT%H:%M";

const ACCEPTED_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parses a timezone-less local timestamp.
///
/// Strings carrying a `Z` designator or a UTC offset do not match any
/// accepted format and yield `None`.
pub fn parse_local(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

/// Formats an instant in the slot wire format.
pub fn format_local(instant: NaiveDateTime) -> String {
    instant.format(SLOT_FORMAT).to_string()
}

/// A grid-aligned appointment start.
///
/// Slots are only produced by [`crate::SlotGrid`] and [`crate::SlotValidator`].
/// Pickup slots are additionally in business hours on an open day; delivery
/// slots only need the grid. Values read back through serde are checked for
/// minute precision alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Slot(NaiveDateTime);

impl Slot {
    pub(crate) fn new_unchecked(instant: NaiveDateTime) -> Self {
        Self(instant)
    }

    /// Returns the slot start as a naive local datetime.
    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(SLOT_FORMAT))
    }
}

impl From<Slot> for NaiveDateTime {
    fn from(slot: Slot) -> Self {
        slot.0
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.to_string()
    }
}

impl TryFrom<String> for Slot {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let instant = parse_local(&value).ok_or_else(|| format!("invalid slot '{value}'"))?;
        if instant.second() != 0 || instant.nanosecond() != 0 {
            return Err(format!("slot '{value}' has sub-minute precision"));
        }
        Ok(Self(instant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parses_short_local_format() {
        assert_eq!(parse_local("2025-09-08T09:30"), Some(at(2025, 9, 8, 9, 30)));
    }

    #[test]
    fn test_parses_seconds_and_fractions() {
        let parsed = parse_local("2025-09-08T09:30:15.250").unwrap();
        assert_eq!(parsed.second(), 15);
        assert_eq!(parsed.nanosecond(), 250_000_000);

        assert_eq!(
            parse_local("2025-09-08 09:30:00"),
            Some(at(2025, 9, 8, 9, 30))
        );
    }

    #[test]
    fn test_rejects_malformed_and_offset_inputs() {
        for input in [
            "",
            "not-a-date",
            "2025-09-10T09:00:xx",
            "2025-09-10T09:00ZBAD",
            "2025-09-10T09:00Z",
            "2025-09-10T09:00+07:00",
            "2025-09-10T",
            "2025-09",
            "T09:00",
            "2025-02-30T09:00",
        ] {
            assert!(parse_local(input).is_none(), "{input:?} should not parse");
        }
    }

    #[test]
    fn test_format_round_trips_wall_clock() {
        let input = "2025-12-31T15:45";
        let parsed = parse_local(input).unwrap();
        assert_eq!(format_local(parsed), input);
    }

    #[test]
    fn test_slot_serializes_as_local_string() {
        let slot = Slot::new_unchecked(at(2025, 9, 8, 9, 0));
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, "\"2025-09-08T09:00\"");

        let back: Slot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slot);
    }

    #[test]
    fn test_slot_deserialize_rejects_seconds() {
        let result: Result<Slot, _> = serde_json::from_str("\"2025-09-08T09:00:30\"");
        assert!(result.is_err());
    }
}
