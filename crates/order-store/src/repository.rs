use async_trait::async_trait;
use common::{OrderId, Version};
use domain::Order;

use crate::{RepositoryError, Result};

/// Durable keyed storage for orders.
///
/// Records are written whole; there are no partial-field updates. All
/// implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order.
    ///
    /// Fails with `DuplicateOrder` if an order with the same id exists.
    async fn create(&self, order: &Order) -> Result<()>;

    /// Loads an order by id.
    ///
    /// Fails with `NotFound` if absent.
    async fn get(&self, order_id: OrderId) -> Result<Order>;

    /// Replaces a stored order, compare-and-swap on its version.
    ///
    /// The write only happens if the stored version equals `order.version()`.
    /// Returns the new version. Fails with `NotFound` if the id does not
    /// exist and with `VersionConflict` if another writer updated it first.
    async fn update(&self, order: &Order) -> Result<Version>;
}

/// Extension trait providing convenience methods for repositories.
#[async_trait]
pub trait OrderRepositoryExt: OrderRepository {
    /// Loads an order, returning None instead of `NotFound`.
    async fn find(&self, order_id: OrderId) -> Result<Option<Order>> {
        match self.get(order_id).await {
            Ok(order) => Ok(Some(order)),
            Err(RepositoryError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Checks if an order exists.
    async fn exists(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.find(order_id).await?.is_some())
    }
}

// Blanket implementation for all OrderRepository implementations
impl<T: OrderRepository + ?Sized> OrderRepositoryExt for T {}
