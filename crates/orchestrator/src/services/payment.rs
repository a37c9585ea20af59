//! Payment client trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use common::{OrderId, TransactionId, UserId};

use super::ServiceError;

/// Client for the external payment gateway.
#[async_trait]
pub trait PaymentClient: Send + Sync {
    /// Charges the user for the order and returns the gateway transaction id.
    async fn pay(
        &self,
        order_id: OrderId,
        user_id: UserId,
        payment_method: &str,
    ) -> Result<TransactionId, ServiceError>;
}

/// A charge recorded by [`InMemoryPaymentClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub payment_method: String,
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: HashMap<TransactionId, PaymentRecord>,
    next_transaction_id: Option<TransactionId>,
    fail_on_pay: bool,
    latency: Option<Duration>,
    attempt_count: usize,
}

/// In-memory payment gateway.
///
/// Issues a random transaction id per charge unless one has been scripted
/// with [`InMemoryPaymentClient::set_next_transaction_id`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentClient {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentClient {
    /// Creates a new in-memory payment client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent charge fail with `Rejected`.
    pub fn set_fail_on_pay(&self, fail: bool) {
        self.write().fail_on_pay = fail;
    }

    /// Delays every subsequent charge by `latency` before it is recorded.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.write().latency = latency;
    }

    /// Uses `transaction_id` for the next successful charge.
    pub fn set_next_transaction_id(&self, transaction_id: TransactionId) {
        self.write().next_transaction_id = Some(transaction_id);
    }

    /// Returns the number of successful charges.
    pub fn payment_count(&self) -> usize {
        self.read().payments.len()
    }

    /// Returns the number of charge attempts, successful or not.
    pub fn attempt_count(&self) -> usize {
        self.read().attempt_count
    }

    /// Returns the number of successful charges for an order.
    pub fn payments_for(&self, order_id: OrderId) -> usize {
        self.read()
            .payments
            .values()
            .filter(|p| p.order_id == order_id)
            .count()
    }

    /// Returns the charge recorded under `transaction_id`.
    pub fn payment(&self, transaction_id: TransactionId) -> Option<PaymentRecord> {
        self.read().payments.get(&transaction_id).cloned()
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryPaymentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryPaymentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentClient for InMemoryPaymentClient {
    async fn pay(
        &self,
        order_id: OrderId,
        user_id: UserId,
        payment_method: &str,
    ) -> Result<TransactionId, ServiceError> {
        let latency = {
            let mut state = self.write();
            state.attempt_count += 1;
            state.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.write();
        if state.fail_on_pay {
            return Err(ServiceError::Rejected("Payment declined".to_string()));
        }

        let transaction_id = state
            .next_transaction_id
            .take()
            .unwrap_or_else(TransactionId::new);
        state.payments.insert(
            transaction_id,
            PaymentRecord {
                order_id,
                user_id,
                payment_method: payment_method.to_string(),
            },
        );

        Ok(transaction_id)
    }
}
