use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use domain::Order;
use tokio::sync::RwLock;

use crate::{OrderId, OrderRepository, RepositoryError, Result, Version};

/// In-memory order repository.
///
/// Stores orders in a map behind a read-write lock and provides the same
/// compare-and-swap semantics as the PostgreSQL implementation. Cloning
/// shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    fail_on_write: Arc<AtomicBool>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Removes all orders.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }

    /// Makes every subsequent create/update fail with `Unavailable`.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "write rejected by in-memory repository".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<()> {
        self.check_writable()?;

        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(RepositoryError::DuplicateOrder(order.id()));
        }
        orders.insert(order.id(), order.clone());

        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .read()
            .await
            .get(&order_id)
            .cloned()
            .ok_or(RepositoryError::NotFound(order_id))
    }

    async fn update(&self, order: &Order) -> Result<Version> {
        self.check_writable()?;

        let order_id = order.id();
        let mut orders = self.orders.write().await;

        let stored = orders
            .get(&order_id)
            .ok_or(RepositoryError::NotFound(order_id))?;

        if stored.version() != order.version() {
            return Err(RepositoryError::VersionConflict {
                order_id,
                expected: order.version(),
                actual: stored.version(),
            });
        }

        let new_version = order.version().next();
        let mut replacement = order.clone();
        replacement.set_version(new_version);
        orders.insert(order_id, replacement);

        Ok(new_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrderRepositoryExt;
    use common::{PartId, TransactionId, UserId};
    use domain::{Money, OrderStatus};

    fn new_order() -> Order {
        Order::new(UserId::new(), vec![PartId::new()], Money::from_cents(1000)).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryOrderRepository::new();
        let order = new_order();

        repo.create(&order).await.unwrap();

        let loaded = repo.get(order.id()).await.unwrap();
        assert_eq!(loaded, order);
        assert_eq!(repo.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_order() {
        let repo = InMemoryOrderRepository::new();
        let id = OrderId::new();

        let err = repo.get(id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(missing) if missing == id));
        assert!(repo.find(id).await.unwrap().is_none());
        assert!(!repo.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let repo = InMemoryOrderRepository::new();
        let order = new_order();
        repo.create(&order).await.unwrap();

        let err = repo.create(&order).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateOrder(_)));
        assert_eq!(repo.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_bumps_version_and_overwrites() {
        let repo = InMemoryOrderRepository::new();
        let mut order = new_order();
        repo.create(&order).await.unwrap();

        let tx = TransactionId::new();
        order.mark_paid("CARD", tx).unwrap();
        let version = repo.update(&order).await.unwrap();
        assert_eq!(version, Version::new(2));

        let loaded = repo.get(order.id()).await.unwrap();
        assert_eq!(loaded.status(), OrderStatus::Paid);
        assert_eq!(loaded.transaction_id(), Some(tx));
        assert_eq!(loaded.version(), Version::new(2));
    }

    #[tokio::test]
    async fn test_update_with_stale_version_conflicts() {
        let repo = InMemoryOrderRepository::new();
        let order = new_order();
        repo.create(&order).await.unwrap();

        let mut first = order.clone();
        first.cancel().unwrap();
        repo.update(&first).await.unwrap();

        let mut second = order.clone();
        second.mark_paid("CARD", TransactionId::new()).unwrap();
        let err = repo.update(&second).await.unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::VersionConflict { expected, actual, .. }
                if expected == Version::first() && actual == Version::new(2)
        ));
        let loaded = repo.get(order.id()).await.unwrap();
        assert_eq!(loaded.status(), OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_update_missing_order() {
        let repo = InMemoryOrderRepository::new();
        let order = new_order();

        let err = repo.update(&order).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
        assert_eq!(repo.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_fail_on_write() {
        let repo = InMemoryOrderRepository::new();
        repo.set_fail_on_write(true);

        let err = repo.create(&new_order()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Unavailable(_)));
        assert_eq!(repo.order_count().await, 0);

        repo.set_fail_on_write(false);
        repo.create(&new_order()).await.unwrap();
        assert_eq!(repo.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryOrderRepository::new();
        let other = repo.clone();
        let order = new_order();

        repo.create(&order).await.unwrap();
        assert!(other.exists(order.id()).await.unwrap());

        other.clear().await;
        assert_eq!(repo.order_count().await, 0);
    }
}
