//! Order persistence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CustomerId, OrderId};
use tokio::sync::RwLock;

use super::{Order, OrderError};

/// Storage for orders.
///
/// Saves are optimistic: the caller passes the version it read and the store
/// rejects the write if another save got there first.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order.
    async fn insert(&self, order: Order) -> Result<(), OrderError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError>;

    /// All orders, ordered by pickup slot.
    async fn list(&self) -> Result<Vec<Order>, OrderError>;

    async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, OrderError>;

    /// Replaces an order if its stored version equals `expected_version`.
    ///
    /// Returns the saved order with its version bumped.
    async fn save(&self, order: Order, expected_version: u64) -> Result<Order, OrderError>;

    /// Removes an order, returning it if it existed.
    async fn remove(&self, id: OrderId) -> Result<Option<Order>, OrderError>;
}

/// In-memory order store.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

fn sorted(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| {
        a.pickup_slot
            .cmp(&b.pickup_slot)
            .then(a.created_at.cmp(&b.created_at))
    });
    orders
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), OrderError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(OrderError::AlreadyExists(order.id));
        }
        orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.read().await;
        Ok(sorted(orders.values().cloned().collect()))
    }

    async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.read().await;
        Ok(sorted(
            orders
                .values()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect(),
        ))
    }

    async fn save(&self, mut order: Order, expected_version: u64) -> Result<Order, OrderError> {
        let mut orders = self.orders.write().await;

        let current = orders
            .get(&order.id)
            .map(|o| o.version)
            .ok_or(OrderError::NotFound(order.id))?;

        if current != expected_version {
            return Err(OrderError::ConcurrencyConflict {
                order_id: order.id,
                expected: expected_version,
                actual: current,
            });
        }

        order.version = current + 1;
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn remove(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.write().await.remove(&id))
    }
}
