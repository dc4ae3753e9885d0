//! The order record.

use chrono::{DateTime, NaiveDateTime, Utc};
use common::{CustomerId, Money, OrderId};
use scheduling::{Booking, Slot};
use serde::{Deserialize, Serialize};

use super::{OrderStatus, Tier};
use crate::pricing::PriceOptions;

/// A booked laundry order.
///
/// An order occupies its pickup slot for as long as it exists. `version`
/// starts at 1 and is bumped by the store on every successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub pickup_slot: Slot,
    pub delivery_slot: Slot,
    pub tier: Tier,
    pub weight_kg: Option<f64>,
    pub price_options: PriceOptions,
    pub price: Money,
    pub paid: bool,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

/// Everything needed to place an order once slot and payment have cleared.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub pickup_slot: Slot,
    pub delivery_slot: Slot,
    pub tier: Tier,
    pub weight_kg: Option<f64>,
    pub price_options: PriceOptions,
    pub price: Money,
}

impl Order {
    /// Creates a paid order in `Placed`.
    pub fn place(new: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::new(),
            customer_id: new.customer_id,
            customer_name: new.customer_name,
            phone: new.phone,
            address: new.address,
            pickup_slot: new.pickup_slot,
            delivery_slot: new.delivery_slot,
            tier: new.tier,
            weight_kg: new.weight_kg,
            price_options: new.price_options,
            price: new.price,
            paid: true,
            status: OrderStatus::Placed,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Returns true while the pickup has not started yet.
    pub fn is_before_pickup(&self, local_now: NaiveDateTime) -> bool {
        local_now < self.pickup_slot.as_datetime()
    }
}

impl Booking for Order {
    fn pickup_instant(&self) -> Option<NaiveDateTime> {
        Some(self.pickup_slot.as_datetime())
    }
}
