//! Booking commands.

use common::CustomerId;

use crate::order::Tier;
use crate::payment::PaymentToken;
use crate::pricing::PriceOptions;

/// Command to book a new order.
///
/// Slots are raw client strings; the service validates them. When `tier` is
/// absent it is derived from `weight_kg`.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub customer_id: CustomerId,
    pub phone: String,
    pub address: String,
    pub pickup_slot: String,
    pub delivery_slot: String,
    pub tier: Option<Tier>,
    pub weight_kg: Option<f64>,
    pub price_options: PriceOptions,
    pub payment_token: PaymentToken,
}

/// Partial update of an order before pickup.
///
/// A tier change needs `payment_token` for the new price.
#[derive(Debug, Clone, Default)]
pub struct EditOrder {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub delivery_slot: Option<String>,
    pub weight_kg: Option<f64>,
    pub tier: Option<Tier>,
    pub payment_token: Option<PaymentToken>,
}

impl EditOrder {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.address.is_none()
            && self.delivery_slot.is_none()
            && self.weight_kg.is_none()
            && self.tier.is_none()
    }
}
