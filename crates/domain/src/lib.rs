//! Domain layer for the laundry booking engine.
//!
//! This crate provides:
//! - the order record and its status state machine
//! - an order store abstraction with an in-memory implementation
//! - the single-use payment token ledger
//! - pricing rules
//! - [`BookingService`], which ties slot validation, payment and persistence together

pub mod booking;
pub mod clock;
pub mod customer;
pub mod error;
pub mod order;
pub mod payment;
pub mod pricing;

pub use booking::{BookingService, CreateOrder, EditOrder};
pub use clock::{Clock, ManualClock, SystemClock};
pub use customer::{Customer, CustomerDirectory};
pub use error::DomainError;
pub use order::{
    InMemoryOrderStore, Order, OrderError, OrderService, OrderStatus, OrderStore, Tier,
    can_advance,
};
pub use payment::{
    InMemoryPaymentLedger, PaymentError, PaymentLedger, PaymentRecord, PaymentToken,
};
pub use pricing::{PriceOptions, compute_price, tier_for_weight};
