//! Shared application state.

use domain::{BookingService, InMemoryPaymentLedger, OrderStore};

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub booking: BookingService<S, InMemoryPaymentLedger>,
}
