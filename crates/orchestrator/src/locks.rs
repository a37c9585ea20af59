//! Per-order mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::OrderId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Entries = Arc<Mutex<HashMap<OrderId, Arc<AsyncMutex<()>>>>>;

/// Registry of per-order async locks.
///
/// Operations on the same order are serialized; operations on different
/// orders never wait on each other. An entry lives only while some task
/// holds or waits for it.
#[derive(Debug, Clone, Default)]
pub struct OrderLocks {
    entries: Entries,
}

/// Holds the lock for one order until dropped.
#[derive(Debug)]
pub struct OrderLockGuard {
    order_id: OrderId,
    guard: OwnedMutexGuard<()>,
    entries: Entries,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds the lock for `order_id`, then takes it.
    pub async fn acquire(&self, order_id: OrderId) -> OrderLockGuard {
        let entry = Arc::clone(lock_entries(&self.entries).entry(order_id).or_default());
        let mut waiting = Waiting {
            order_id,
            entry: Some(Arc::clone(&entry)),
            entries: &self.entries,
        };
        let guard = entry.lock_owned().await;
        waiting.entry = None;

        OrderLockGuard {
            order_id,
            guard,
            entries: Arc::clone(&self.entries),
        }
    }

    /// Returns the number of orders currently locked or awaited.
    pub fn len(&self) -> usize {
        lock_entries(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderLockGuard {
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }
}

impl Drop for OrderLockGuard {
    fn drop(&mut self) {
        let mut entries = lock_entries(&self.entries);
        // One reference from the map, one from this guard: nobody is waiting.
        if Arc::strong_count(OwnedMutexGuard::mutex(&self.guard)) == 2 {
            entries.remove(&self.order_id);
        }
    }
}

/// Cleans up after a caller that stopped waiting before it got the lock.
struct Waiting<'a> {
    order_id: OrderId,
    entry: Option<Arc<AsyncMutex<()>>>,
    entries: &'a Entries,
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        let Some(entry) = self.entry.take() else {
            return;
        };
        drop(entry);

        let mut entries = lock_entries(self.entries);
        // Only the map still refers to the lock: nobody holds or awaits it.
        if entries
            .get(&self.order_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            entries.remove(&self.order_id);
        }
    }
}

fn lock_entries(entries: &Entries) -> MutexGuard<'_, HashMap<OrderId, Arc<AsyncMutex<()>>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let locks = OrderLocks::new();
        let order_id = OrderId::new();

        let guard = locks.acquire(order_id).await;
        assert_eq!(guard.order_id(), order_id);
        assert_eq!(locks.len(), 1);

        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_orders_do_not_block() {
        let locks = OrderLocks::new();

        let _a = locks.acquire(OrderId::new()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(OrderId::new())).await;

        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_same_order_is_serialized() {
        let locks = OrderLocks::new();
        let order_id = OrderId::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let locks = locks.clone();
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(order_id).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_waiter_keeps_entry_alive() {
        let locks = OrderLocks::new();
        let order_id = OrderId::new();

        let first = locks.acquire(order_id).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(order_id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_waiter_releases_entry() {
        let locks = OrderLocks::new();
        let order_id = OrderId::new();

        let first = locks.acquire(order_id).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(order_id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        waiter.abort();
        let _ = waiter.await;

        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_timed_out_waiter_leaves_holder_entry() {
        let locks = OrderLocks::new();
        let order_id = OrderId::new();

        let first = locks.acquire(order_id).await;
        let waited =
            tokio::time::timeout(Duration::from_millis(20), locks.acquire(order_id)).await;
        assert!(waited.is_err());
        assert_eq!(locks.len(), 1);

        drop(first);
        assert!(locks.is_empty());
    }
}
