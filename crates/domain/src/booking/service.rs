//! Booking service.

use std::sync::Arc;

use chrono::NaiveDate;
use common::{CustomerId, Money, OrderId};
use scheduling::{Slot, SlotValidator, ValidationResult};
use tokio::sync::Mutex;

use super::{CreateOrder, EditOrder};
use crate::clock::{Clock, SystemClock};
use crate::customer::{Customer, CustomerDirectory};
use crate::error::DomainError;
use crate::order::{NewOrder, Order, OrderError, OrderService, OrderStatus, OrderStore, Tier};
use crate::payment::{PaymentLedger, PaymentRecord, PaymentToken};
use crate::pricing::{PriceOptions, compute_price, tier_for_weight};

/// Service for booking, editing and cancelling orders.
///
/// Every write that depends on slot occupancy or consumes a payment token
/// runs under one write gate, so validate-then-insert cannot interleave with
/// another booking.
pub struct BookingService<S: OrderStore, L: PaymentLedger> {
    orders: OrderService<S>,
    ledger: L,
    customers: CustomerDirectory,
    validator: SlotValidator,
    clock: Arc<dyn Clock>,
    write_gate: Mutex<()>,
}

impl<S: OrderStore, L: PaymentLedger> BookingService<S, L> {
    /// Creates a new booking service on the system clock.
    pub fn new(store: S, ledger: L, validator: SlotValidator) -> Self {
        Self::with_clock(store, ledger, validator, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: S,
        ledger: L,
        validator: SlotValidator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders: OrderService::with_clock(store, clock.clone()),
            ledger,
            customers: CustomerDirectory::new(),
            validator,
            clock,
            write_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        self.orders.store()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn validator(&self) -> &SlotValidator {
        &self.validator
    }

    pub async fn register_customer(&self, name: impl Into<String>, is_member: bool) -> Customer {
        self.customers.register(name, is_member).await
    }

    pub async fn customer(&self, id: CustomerId) -> Option<Customer> {
        self.customers.get(id).await
    }

    async fn require_customer(&self, id: CustomerId) -> Result<Customer, DomainError> {
        self.customers
            .get(id)
            .await
            .ok_or(DomainError::CustomerNotFound(id))
    }

    /// Price of `tier` for this customer.
    pub async fn quote(
        &self,
        customer_id: CustomerId,
        tier: Tier,
        options: &PriceOptions,
    ) -> Result<Money, DomainError> {
        let customer = self.require_customer(customer_id).await?;
        Ok(compute_price(tier, customer.is_member, options))
    }

    #[tracing::instrument(skip(self))]
    pub async fn issue_payment(
        &self,
        customer_id: CustomerId,
        amount: Money,
    ) -> Result<PaymentRecord, DomainError> {
        self.require_customer(customer_id).await?;
        Ok(self.ledger.issue(customer_id, amount).await?)
    }

    pub async fn payment(&self, token: &PaymentToken) -> Option<PaymentRecord> {
        self.ledger.lookup(token).await
    }

    /// Validates a pickup request against the current orders.
    #[tracing::instrument(skip(self))]
    pub async fn validate_slot(&self, requested: &str) -> Result<ValidationResult, DomainError> {
        let orders = self.orders.store().list().await?;
        Ok(self.validator.validate(&orders, requested)?)
    }

    /// Free pickup slots on `date`.
    pub async fn available_slots(&self, date: NaiveDate) -> Result<Vec<Slot>, DomainError> {
        let orders = self.orders.store().list().await?;
        Ok(self.validator.list_available_slots(&orders, date))
    }

    /// Books an order.
    ///
    /// The pickup is validated before the token is touched, so a rejected
    /// slot leaves the payment unused. The price is always recomputed here
    /// and must match the token exactly.
    #[tracing::instrument(
        skip(self, cmd),
        fields(customer_id = %cmd.customer_id, pickup = %cmd.pickup_slot)
    )]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order, DomainError> {
        let required = [
            ("phone", cmd.phone.as_str()),
            ("address", cmd.address.as_str()),
            ("pickupSlot", cmd.pickup_slot.as_str()),
            ("deliverySlot", cmd.delivery_slot.as_str()),
            ("paymentToken", cmd.payment_token.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(DomainError::MissingField(*field));
        }
        let customer = self.require_customer(cmd.customer_id).await?;
        let tier = match (cmd.tier, cmd.weight_kg) {
            (Some(tier), _) => tier,
            (None, Some(kg)) => tier_for_weight(kg),
            (None, None) => return Err(DomainError::TierRequired),
        };
        let price = compute_price(tier, customer.is_member, &cmd.price_options);

        let _gate = self.write_gate.lock().await;

        let existing = self.orders.store().list().await?;
        let pickup_slot = match self.validator.validate(&existing, &cmd.pickup_slot)? {
            ValidationResult::Accepted { normalized_slot } => normalized_slot,
            ValidationResult::Rejected { reason, suggestion } => {
                tracing::info!(%reason, "pickup slot rejected");
                return Err(DomainError::SlotRejected { reason, suggestion });
            }
        };
        let delivery_slot = self
            .validator
            .delivery_after(pickup_slot, &cmd.delivery_slot)
            .ok_or_else(|| DomainError::InvalidDeliverySlot(cmd.delivery_slot.clone()))?;

        if !self
            .ledger
            .verify_and_consume(&cmd.payment_token, customer.id, price)
            .await
        {
            return Err(DomainError::PaymentRequired);
        }

        let order = Order::place(
            NewOrder {
                customer_id: customer.id,
                customer_name: customer.name,
                phone: cmd.phone,
                address: cmd.address,
                pickup_slot,
                delivery_slot,
                tier,
                weight_kg: cmd.weight_kg,
                price_options: cmd.price_options,
                price,
            },
            self.clock.now(),
        );
        self.orders.store().insert(order.clone()).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, %pickup_slot, %price, "order created");

        Ok(order)
    }

    /// Moves an order to its next status.
    pub async fn advance_status(
        &self,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, DomainError> {
        let _gate = self.write_gate.lock().await;
        Ok(self.orders.advance(order_id, next).await?)
    }

    /// Applies a patch to an order that has not been picked up yet.
    #[tracing::instrument(skip(self, patch))]
    pub async fn edit_order(&self, order_id: OrderId, patch: EditOrder) -> Result<Order, DomainError> {
        let _gate = self.write_gate.lock().await;

        let order = self.load(order_id).await?;
        if !order.is_before_pickup(self.clock.local_now()) {
            return Err(OrderError::EditWindowClosed(order_id).into());
        }
        if patch.is_empty() {
            return Ok(order);
        }

        let expected_version = order.version;
        let mut updated = order.clone();

        if let Some(phone) = patch.phone {
            updated.phone = phone;
        }
        if let Some(address) = patch.address {
            updated.address = address;
        }
        if let Some(weight_kg) = patch.weight_kg {
            updated.weight_kg = Some(weight_kg);
        }
        if let Some(requested) = patch.delivery_slot {
            updated.delivery_slot = self
                .validator
                .delivery_after(order.pickup_slot, &requested)
                .ok_or(DomainError::InvalidDeliverySlot(requested))?;
        }

        if let Some(tier) = patch.tier.filter(|tier| *tier != order.tier) {
            let customer = self.require_customer(order.customer_id).await?;
            let price = compute_price(tier, customer.is_member, &order.price_options);
            let token = patch
                .payment_token
                .as_ref()
                .ok_or(DomainError::PaymentTokenRequired)?;
            if !self
                .ledger
                .verify_and_consume(token, order.customer_id, price)
                .await
            {
                return Err(DomainError::PaymentRequired);
            }
            tracing::info!(%order_id, from = %order.tier, to = %tier, %price, "tier changed");
            updated.tier = tier;
            updated.price = price;
            updated.paid = true;
        }

        updated.updated_at = self.clock.now();
        Ok(self.orders.store().save(updated, expected_version).await?)
    }

    /// Cancels an order that has not been picked up yet, freeing its slot.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        let _gate = self.write_gate.lock().await;

        let order = self.load(order_id).await?;
        if !order.is_before_pickup(self.clock.local_now()) {
            return Err(OrderError::CancelWindowClosed(order_id).into());
        }
        self.orders.store().remove(order_id).await?;

        tracing::info!(%order_id, pickup_slot = %order.pickup_slot, "order cancelled");
        Ok(order)
    }

    pub async fn order(&self, order_id: OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.get_order(order_id).await?)
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.store().list().await?)
    }

    pub async fn list_orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.store().list_for_customer(customer_id).await?)
    }

    async fn load(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id).into())
    }
}
