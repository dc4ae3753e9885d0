//! In-process customer directory.
//!
//! Identity and authentication live outside this engine; the directory only
//! records what pricing and payment need: an id and membership.

use std::collections::HashMap;
use std::sync::Arc;

use common::CustomerId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub is_member: bool,
}

/// Shared, cloneable customer registry.
#[derive(Debug, Clone, Default)]
pub struct CustomerDirectory {
    customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
}

impl CustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a customer under a fresh id.
    pub async fn register(&self, name: impl Into<String>, is_member: bool) -> Customer {
        let customer = Customer {
            id: CustomerId::new(),
            name: name.into(),
            is_member,
        };
        self.customers
            .write()
            .await
            .insert(customer.id, customer.clone());
        tracing::debug!(customer_id = %customer.id, is_member, "customer registered");
        customer
    }

    pub async fn get(&self, id: CustomerId) -> Option<Customer> {
        self.customers.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.customers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.customers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_lookup() {
        let directory = CustomerDirectory::new();
        assert!(directory.is_empty().await);

        let alice = directory.register("Alice", true).await;
        let bob = directory.register("Bob", false).await;

        assert_eq!(directory.len().await, 2);
        assert_eq!(directory.get(alice.id).await, Some(alice.clone()));
        assert!(!directory.get(bob.id).await.unwrap().is_member);
        assert!(directory.get(CustomerId::new()).await.is_none());
    }
}
