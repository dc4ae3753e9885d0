//! Single-use payment tokens.

mod ledger;

pub use ledger::{InMemoryPaymentLedger, PaymentLedger, PaymentRecord, PaymentToken};

use common::Money;
use thiserror::Error;

/// Errors that can occur when issuing payments.
///
/// Consumption never errors: a failed verification is reported as `false`
/// without saying which check failed.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Invalid payment amount: {0} (must be greater than 0)")]
    InvalidAmount(Money),
}
