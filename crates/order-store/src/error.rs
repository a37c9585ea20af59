use common::{OrderId, Version};
use thiserror::Error;

/// Errors that can occur when interacting with the order repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No order with the given id exists.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// An order with the same id already exists.
    #[error("Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// The stored version did not match the version the writer read.
    #[error(
        "Concurrent modification of order {order_id}: expected version {expected}, found {actual}"
    )]
    VersionConflict {
        order_id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// A stored row could not be turned back into an order.
    #[error("Invalid stored order {order_id}: {reason}")]
    InvalidRecord { order_id: OrderId, reason: String },

    /// The backend refused the operation.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
