//! Order service providing status transitions over a store.

use std::sync::Arc;

use common::OrderId;

use super::{Order, OrderError, OrderStatus, OrderStore};
use crate::clock::{Clock, SystemClock};

/// Service for reading orders and moving them through their lifecycle.
pub struct OrderService<S: OrderStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service over the given store, using the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an order by ID.
    ///
    /// Returns None if the order doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, OrderError> {
        self.store.get(order_id).await
    }

    /// Moves an order to `next` if the transition is legal.
    ///
    /// The status and `updated_at` change together in one versioned save. If
    /// another writer saved the order in between, the store reports a
    /// conflict and nothing changes.
    #[tracing::instrument(skip(self))]
    pub async fn advance(&self, order_id: OrderId, next: OrderStatus) -> Result<Order, OrderError> {
        let order = self
            .store
            .get(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        let from = order.status;
        if !from.can_advance_to(next) {
            tracing::warn!(%order_id, %from, to = %next, "illegal status transition");
            return Err(OrderError::IllegalTransition { from, to: next });
        }

        let expected_version = order.version;
        let mut updated = order;
        updated.status = next;
        updated.updated_at = self.clock.now();

        let saved = self.store.save(updated, expected_version).await?;

        metrics::counter!("order_transitions_total", "to" => next.as_str()).increment(1);
        tracing::info!(%order_id, %from, to = %next, "order status advanced");

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};
    use common::{CustomerId, Money};
    use scheduling::Slot;

    use super::*;
    use crate::clock::ManualClock;
    use crate::order::{InMemoryOrderStore, NewOrder, Tier};
    use crate::pricing::PriceOptions;

    fn slot(s: &str) -> Slot {
        serde_json::from_value(serde_json::Value::String(s.to_string())).unwrap()
    }

    async fn seeded() -> (OrderService<InMemoryOrderStore>, Arc<ManualClock>, Order) {
        let start = NaiveDate::from_ymd_opt(2025, 9, 8)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let store = InMemoryOrderStore::new();
        let order = Order::place(
            NewOrder {
                customer_id: CustomerId::new(),
                customer_name: "Alice".to_string(),
                phone: "0812345678".to_string(),
                address: "1 Soi Sukhumvit".to_string(),
                pickup_slot: slot("2025-09-08T09:00"),
                delivery_slot: slot("2025-09-08T15:00"),
                tier: Tier::Medium,
                weight_kg: Some(8.0),
                price_options: PriceOptions::default(),
                price: Money::from_major(300),
            },
            clock.now(),
        );
        store.insert(order.clone()).await.unwrap();
        let service = OrderService::with_clock(store, clock.clone());
        (service, clock, order)
    }

    #[tokio::test]
    async fn test_advance_through_full_lifecycle() {
        let (service, clock, order) = seeded().await;

        let mut version = order.version;
        for next in [
            OrderStatus::PickedUp,
            OrderStatus::Washing,
            OrderStatus::OutForDelivery,
            OrderStatus::Completed,
        ] {
            clock.advance(TimeDelta::hours(1));
            let updated = service.advance(order.id, next).await.unwrap();
            assert_eq!(updated.status, next);
            assert_eq!(updated.updated_at, clock.now());
            assert_eq!(updated.version, version + 1);
            version = updated.version;
        }

        let err = service
            .advance(order.id, OrderStatus::Placed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::IllegalTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Placed
            }
        ));
    }

    #[tokio::test]
    async fn test_illegal_transition_leaves_order_untouched() {
        let (service, clock, order) = seeded().await;
        clock.advance(TimeDelta::hours(1));

        let err = service
            .advance(order.id, OrderStatus::Washing)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::IllegalTransition { .. }));

        let stored = service.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored, order);
    }

    #[tokio::test]
    async fn test_advance_unknown_order() {
        let (service, _, _) = seeded().await;
        let missing = OrderId::new();
        let err = service
            .advance(missing, OrderStatus::PickedUp)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_failed_pickup_is_terminal() {
        let (service, _, order) = seeded().await;
        service
            .advance(order.id, OrderStatus::FailedPickup)
            .await
            .unwrap();
        for next in OrderStatus::ALL {
            assert!(service.advance(order.id, next).await.is_err());
        }
    }
}
