//! Value objects for orders.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Load size of an order, which sets its base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Small,
    Medium,
    Large,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Small => "SMALL",
            Tier::Medium => "MEDIUM",
            Tier::Large => "LARGE",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SMALL" => Ok(Tier::Small),
            "MEDIUM" => Ok(Tier::Medium),
            "LARGE" => Ok(Tier::Large),
            _ => Err(format!("unknown tier '{s}'")),
        }
    }
}
