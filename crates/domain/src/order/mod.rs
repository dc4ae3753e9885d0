//! Orders and their lifecycle.

mod record;
mod service;
mod state;
mod store;
mod value_objects;

pub use record::{NewOrder, Order};
pub use service::OrderService;
pub use state::{OrderStatus, can_advance};
pub use store::{InMemoryOrderStore, OrderStore};
pub use value_objects::Tier;

use common::OrderId;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    #[error("Order already exists: {0}")]
    AlreadyExists(OrderId),

    /// The requested status does not follow the current one.
    #[error("Illegal transition: {from} -> {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// Another writer saved the order since it was read.
    #[error("Concurrency conflict on order {order_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: u64,
        actual: u64,
    },

    #[error("Edits are not allowed after pickup start")]
    EditWindowClosed(OrderId),

    #[error("Cancellation not allowed after pickup start")]
    CancelWindowClosed(OrderId),
}
