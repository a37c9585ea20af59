//! Order entity.

use chrono::{DateTime, SubsecRound, Utc};
use common::{OrderId, PartId, TransactionId, UserId, Version};
use serde::{Deserialize, Serialize};

use super::{Money, OrderError, OrderStatus};

/// A priced, stateful record of a user's request to purchase a set of parts.
///
/// The part list and total price are fixed at creation. The only mutations
/// are [`Order::mark_paid`] and [`Order::cancel`], both of which require the
/// order to be `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: OrderId,

    /// User who placed the order.
    user_id: UserId,

    /// Parts composing the order, in request order. Never empty.
    part_ids: Vec<PartId>,

    /// Sum of the catalog prices observed at creation.
    total_price: Money,

    /// Current lifecycle status.
    status: OrderStatus,

    /// Payment method used, set only once paid.
    payment_method: Option<String>,

    /// Gateway transaction, set only once paid.
    transaction_id: Option<TransactionId>,

    /// Stored version for optimistic concurrency.
    version: Version,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Raw field set used to rehydrate an [`Order`] from storage.
///
/// Storage adapters read rows into this struct and call [`Order::restore`];
/// it performs no validation because the data was validated when written.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: OrderId,
    pub user_id: UserId,
    pub part_ids: Vec<PartId>,
    pub total_price: Money,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<TransactionId>,
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new pending order with a freshly allocated id.
    ///
    /// Fails with [`OrderError::PartsNotSpecified`] if `part_ids` is empty.
    pub fn new(
        user_id: UserId,
        part_ids: Vec<PartId>,
        total_price: Money,
    ) -> Result<Self, OrderError> {
        if part_ids.is_empty() {
            return Err(OrderError::PartsNotSpecified);
        }
        if total_price.is_negative() {
            return Err(OrderError::NegativeTotal { total_price });
        }

        let now = now();
        Ok(Self {
            id: OrderId::new(),
            user_id,
            part_ids,
            total_price,
            status: OrderStatus::Pending,
            payment_method: None,
            transaction_id: None,
            version: Version::first(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrates an order from its stored fields.
    pub fn restore(record: OrderRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            part_ids: record.part_ids,
            total_price: record.total_price,
            status: record.status,
            payment_method: record.payment_method,
            transaction_id: record.transaction_id,
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Records a successful payment, moving the order to `Paid`.
    pub fn mark_paid(
        &mut self,
        payment_method: impl Into<String>,
        transaction_id: TransactionId,
    ) -> Result<(), OrderError> {
        let payment_method = payment_method.into();
        if payment_method.trim().is_empty() {
            return Err(OrderError::PaymentMethodRequired);
        }
        self.status.ensure_pending()?;

        self.status = OrderStatus::Paid;
        self.payment_method = Some(payment_method);
        self.transaction_id = Some(transaction_id);
        self.updated_at = now();
        Ok(())
    }

    /// Cancels a pending order.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.status.ensure_pending()?;

        self.status = OrderStatus::Cancelled;
        self.updated_at = now();
        Ok(())
    }

    /// Sets the stored version after a successful write.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn part_ids(&self) -> &[PartId] {
        &self.part_ids
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.transaction_id
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Postgres keeps microseconds; truncating here keeps stored and in-memory
// copies equal.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
