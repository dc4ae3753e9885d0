//! Payment ledger trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::PaymentError;
use crate::clock::{Clock, SystemClock};

/// Opaque token proving a payment was made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentToken(String);

impl PaymentToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PaymentToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for PaymentToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// A payment issued to a customer for an exact amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub token: PaymentToken,
    pub customer_id: CustomerId,
    pub amount: Money,
    pub used: bool,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

/// Trait for payment token bookkeeping.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Issues a fresh unused token for `amount`.
    async fn issue(
        &self,
        customer_id: CustomerId,
        amount: Money,
    ) -> Result<PaymentRecord, PaymentError>;

    async fn lookup(&self, token: &PaymentToken) -> Option<PaymentRecord>;

    /// Marks the token used if it exists, is unused and matches the customer
    /// and amount exactly. The check and the mark happen as one step.
    async fn verify_and_consume(
        &self,
        token: &PaymentToken,
        customer_id: CustomerId,
        expected_amount: Money,
    ) -> bool;
}

#[derive(Debug, Default)]
struct LedgerState {
    payments: HashMap<PaymentToken, PaymentRecord>,
    next_seq: u64,
}

/// In-memory payment ledger.
#[derive(Debug, Clone)]
pub struct InMemoryPaymentLedger {
    state: Arc<Mutex<LedgerState>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryPaymentLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPaymentLedger {
    /// Creates a new in-memory ledger on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState::default())),
            clock,
        }
    }

    /// Returns the number of issued payments.
    pub async fn payment_count(&self) -> usize {
        self.state.lock().await.payments.len()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    #[tracing::instrument(skip(self))]
    async fn issue(
        &self,
        customer_id: CustomerId,
        amount: Money,
    ) -> Result<PaymentRecord, PaymentError> {
        if !amount.is_positive() {
            return Err(PaymentError::InvalidAmount(amount));
        }

        let now = self.clock.now();
        let mut state = self.state.lock().await;
        state.next_seq += 1;
        let token = PaymentToken(format!(
            "pay_{}_{}",
            now.timestamp_millis(),
            state.next_seq
        ));

        let record = PaymentRecord {
            token: token.clone(),
            customer_id,
            amount,
            used: false,
            created_at: now,
            used_at: None,
        };
        state.payments.insert(token, record.clone());

        metrics::counter!("payments_issued_total").increment(1);
        tracing::info!(token = %record.token, %customer_id, %amount, "payment issued");

        Ok(record)
    }

    async fn lookup(&self, token: &PaymentToken) -> Option<PaymentRecord> {
        self.state.lock().await.payments.get(token).cloned()
    }

    #[tracing::instrument(skip(self))]
    async fn verify_and_consume(
        &self,
        token: &PaymentToken,
        customer_id: CustomerId,
        expected_amount: Money,
    ) -> bool {
        let mut state = self.state.lock().await;

        let Some(record) = state.payments.get_mut(token) else {
            metrics::counter!("payments_rejected_total").increment(1);
            tracing::warn!(%token, "unknown payment token");
            return false;
        };

        if record.used || record.customer_id != customer_id || record.amount != expected_amount {
            metrics::counter!("payments_rejected_total").increment(1);
            tracing::warn!(%token, "payment token rejected");
            return false;
        }

        record.used = true;
        record.used_at = Some(self.clock.now());

        metrics::counter!("payments_consumed_total").increment(1);
        tracing::info!(%token, %customer_id, "payment token consumed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_lookup() {
        let ledger = InMemoryPaymentLedger::new();
        let customer = CustomerId::new();

        let record = ledger.issue(customer, Money::from_major(210)).await.unwrap();
        assert!(record.token.as_str().starts_with("pay_"));
        assert!(!record.used);
        assert!(record.used_at.is_none());
        assert_eq!(ledger.lookup(&record.token).await, Some(record.clone()));
        assert!(ledger.lookup(&PaymentToken::from("pay_0_0")).await.is_none());
    }

    #[tokio::test]
    async fn test_tokens_are_unique_per_issue() {
        let ledger = InMemoryPaymentLedger::new();
        let customer = CustomerId::new();

        let a = ledger.issue(customer, Money::from_major(200)).await.unwrap();
        let b = ledger.issue(customer, Money::from_major(200)).await.unwrap();
        assert_ne!(a.token, b.token);
        assert!(a.token.as_str().ends_with("_1"));
        assert!(b.token.as_str().ends_with("_2"));
        assert_eq!(ledger.payment_count().await, 2);
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let ledger = InMemoryPaymentLedger::new();
        let customer = CustomerId::new();

        assert!(matches!(
            ledger.issue(customer, Money::zero()).await,
            Err(PaymentError::InvalidAmount(_))
        ));
        assert!(ledger.issue(customer, Money::from_major(-5)).await.is_err());
        assert_eq!(ledger.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        let ledger = InMemoryPaymentLedger::new();
        let customer = CustomerId::new();
        let amount = Money::from_major(210);
        let record = ledger.issue(customer, amount).await.unwrap();

        assert!(ledger.verify_and_consume(&record.token, customer, amount).await);
        assert!(!ledger.verify_and_consume(&record.token, customer, amount).await);

        let stored = ledger.lookup(&record.token).await.unwrap();
        assert!(stored.used);
        assert!(stored.used_at.is_some());
    }

    #[tokio::test]
    async fn test_mismatch_does_not_consume() {
        let ledger = InMemoryPaymentLedger::new();
        let customer = CustomerId::new();
        let amount = Money::from_major(210);
        let record = ledger.issue(customer, amount).await.unwrap();

        assert!(
            !ledger
                .verify_and_consume(&record.token, customer, Money::from_major(200))
                .await
        );
        assert!(
            !ledger
                .verify_and_consume(&record.token, CustomerId::new(), amount)
                .await
        );
        assert!(!ledger.lookup(&record.token).await.unwrap().used);

        assert!(ledger.verify_and_consume(&record.token, customer, amount).await);
    }

    #[tokio::test]
    async fn test_concurrent_consumers_only_one_wins() {
        let ledger = InMemoryPaymentLedger::new();
        let customer = CustomerId::new();
        let amount = Money::from_major(300);
        let record = ledger.issue(customer, amount).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let ledger = ledger.clone();
            let token = record.token.clone();
            handles.push(tokio::spawn(async move {
                ledger.verify_and_consume(&token, customer, amount).await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }
}
