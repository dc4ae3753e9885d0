//! Order status state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Placed ──┬──► PickedUp ──► Washing ──► OutForDelivery ──► Completed
///          │
///          └──► FailedPickup
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Booked and paid, waiting for pickup.
    #[default]
    Placed,

    /// Laundry collected from the customer.
    PickedUp,

    Washing,

    OutForDelivery,

    /// Delivered back to the customer (terminal state).
    Completed,

    /// Nobody was there at pickup time (terminal state).
    FailedPickup,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Placed,
        OrderStatus::PickedUp,
        OrderStatus::Washing,
        OrderStatus::OutForDelivery,
        OrderStatus::Completed,
        OrderStatus::FailedPickup,
    ];

    /// The next status in the main sequence, if any.
    pub fn successor(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Placed => Some(OrderStatus::PickedUp),
            OrderStatus::PickedUp => Some(OrderStatus::Washing),
            OrderStatus::Washing => Some(OrderStatus::OutForDelivery),
            OrderStatus::OutForDelivery => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::FailedPickup => None,
        }
    }

    /// Returns true if the order may move to `next` from this status.
    ///
    /// Only the immediate successor is allowed, plus `FailedPickup` from
    /// `Placed`. Skips, reversals and self-transitions are rejected.
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        if *self == OrderStatus::Placed && next == OrderStatus::FailedPickup {
            return true;
        }
        self.successor() == Some(next)
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::FailedPickup)
    }

    /// Returns the status name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::Washing => "WASHING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::FailedPickup => "FAILED_PICKUP",
        }
    }
}

/// Pure transition predicate.
pub fn can_advance(current: OrderStatus, next: OrderStatus) -> bool {
    current.can_advance_to(next)
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_placed() {
        assert_eq!(OrderStatus::default(), OrderStatus::Placed);
    }

    #[test]
    fn test_main_sequence_advances_one_step() {
        assert!(can_advance(OrderStatus::Placed, OrderStatus::PickedUp));
        assert!(can_advance(OrderStatus::PickedUp, OrderStatus::Washing));
        assert!(can_advance(OrderStatus::Washing, OrderStatus::OutForDelivery));
        assert!(can_advance(OrderStatus::OutForDelivery, OrderStatus::Completed));
    }

    #[test]
    fn test_failed_pickup_only_from_placed() {
        assert!(can_advance(OrderStatus::Placed, OrderStatus::FailedPickup));
        for from in OrderStatus::ALL {
            if from != OrderStatus::Placed {
                assert!(!can_advance(from, OrderStatus::FailedPickup), "{from}");
            }
        }
    }

    #[test]
    fn test_skips_reversals_and_self_transitions_rejected() {
        assert!(!can_advance(OrderStatus::Placed, OrderStatus::Washing));
        assert!(!can_advance(OrderStatus::Washing, OrderStatus::PickedUp));
        for status in OrderStatus::ALL {
            assert!(!can_advance(status, status), "{status}");
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_exit() {
        for from in [OrderStatus::Completed, OrderStatus::FailedPickup] {
            assert!(from.is_terminal());
            assert_eq!(from.successor(), None);
            for to in OrderStatus::ALL {
                assert!(!can_advance(from, to));
            }
        }
        assert!(!OrderStatus::Washing.is_terminal());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(OrderStatus::OutForDelivery.to_string(), "OUT_FOR_DELIVERY");
        assert_eq!(
            serde_json::to_string(&OrderStatus::PickedUp).unwrap(),
            "\"PICKED_UP\""
        );
        assert_eq!(
            "FAILED_PICKUP".parse::<OrderStatus>().unwrap(),
            OrderStatus::FailedPickup
        );
        assert!("picked_up".parse::<OrderStatus>().is_err());
    }
}
