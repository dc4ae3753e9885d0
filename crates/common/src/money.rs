use serde::{Deserialize, Serialize};

/// Money amount held in minor units (hundredths) to avoid floating point issues.
///
/// Prices in this system are quoted in whole currency units, so most amounts
/// are built with [`Money::from_major`]. Equality is exact: payment
/// verification never applies a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    minor: i64,
}

impl Money {
    /// Creates an amount from minor units (e.g., 21000 = 210.00).
    pub fn from_minor(minor: i64) -> Self {
        Self { minor }
    }

    /// Creates an amount from whole currency units.
    pub fn from_major(major: i64) -> Self {
        Self {
            minor: major * 100,
        }
    }

    /// Like [`Money::from_major`], but `None` when the amount does not fit.
    pub fn try_from_major(major: i64) -> Option<Self> {
        major.checked_mul(100).map(|minor| Self { minor })
    }

    pub fn zero() -> Self {
        Self { minor: 0 }
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the whole-unit portion.
    pub fn major(&self) -> i64 {
        self.minor / 100
    }

    /// Returns the minor remainder after the whole units.
    pub fn minor_part(&self) -> i64 {
        self.minor.abs() % 100
    }

    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Clamps negative amounts to zero.
    pub fn floor_zero(self) -> Self {
        Self {
            minor: self.minor.max(0),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.minor < 0 {
            write!(f, "-{}.{:02}", self.major().abs(), self.minor_part())
        } else {
            write!(f, "{}.{:02}", self.major(), self.minor_part())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_major_scales_to_minor_units() {
        let money = Money::from_major(210);
        assert_eq!(money.minor(), 21000);
        assert_eq!(money.major(), 210);
        assert_eq!(money.minor_part(), 0);
    }

    #[test]
    fn display_keeps_two_decimals() {
        assert_eq!(Money::from_minor(21050).to_string(), "210.50");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-1234).to_string(), "-12.34");
    }

    #[test]
    fn floor_clamps_negative_amounts() {
        assert_eq!(Money::from_major(-10).floor_zero(), Money::zero());
        assert!(Money::from_major(50).floor_zero().is_positive());
    }

    #[test]
    fn try_from_major_rejects_overflow() {
        assert_eq!(Money::try_from_major(210), Some(Money::from_minor(21000)));
        assert_eq!(Money::try_from_major(i64::MAX / 100 + 1), None);
        assert_eq!(Money::try_from_major(i64::MIN), None);
    }

    #[test]
    fn serializes_as_minor_units() {
        assert_eq!(serde_json::to_string(&Money::from_major(2)).unwrap(), "200");
    }
}
