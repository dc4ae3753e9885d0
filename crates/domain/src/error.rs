//! Domain error types.

use common::CustomerId;
use scheduling::{RejectReason, SchedulingError, Slot};
use thiserror::Error;

use crate::order::OrderError;
use crate::payment::PaymentError;

/// Errors that can occur during booking operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the order store or state machine.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// An error occurred in the payment ledger.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// The slot search ran past its horizon or the rules are unusable.
    #[error("Scheduling error: {0}")]
    Scheduling(#[from] SchedulingError),

    /// The requested pickup slot was rejected by the validator.
    #[error("{reason}")]
    SlotRejected {
        reason: RejectReason,
        suggestion: Option<Slot>,
    },

    /// The delivery slot is unreadable, off the grid or not after pickup.
    #[error("Invalid delivery slot: {0}")]
    InvalidDeliverySlot(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Neither a tier nor a weight was supplied.
    #[error("Either tier or weightKg is required")]
    TierRequired,

    #[error("Tier change requires paymentToken")]
    PaymentTokenRequired,

    /// Token unknown, already used, or issued for another customer or amount.
    #[error("Payment required or mismatch")]
    PaymentRequired,
}
