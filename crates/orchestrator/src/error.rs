//! Orchestrator error types.

use common::OrderId;
use domain::OrderError;
use order_store::RepositoryError;
use thiserror::Error;

use crate::services::ServiceError;

/// Errors returned by [`OrderOrchestrator`](crate::OrderOrchestrator).
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Validation or state-machine rejection from the order itself.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The catalog did not recognise every requested part.
    #[error("Some parts not found: requested {requested}, found {found}")]
    PartsNotFound { requested: usize, found: usize },

    /// The catalog lookup failed or timed out.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[source] ServiceError),

    /// The payment gateway failed, declined, or timed out.
    #[error("Payment failed: {0}")]
    PaymentFailed(#[source] ServiceError),

    /// No order with this id exists.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order repository failed.
    #[error("Repository error: {0}")]
    RepositoryFailure(#[source] RepositoryError),
}

impl OrchestratorError {
    /// Returns true if the order's current status forbids the operation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Order(e) if e.is_conflict())
    }

    /// Returns true if the order or one of its parts does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::OrderNotFound(_) | Self::PartsNotFound { .. })
    }
}

impl From<RepositoryError> for OrchestratorError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(order_id) => Self::OrderNotFound(order_id),
            other => Self::RepositoryFailure(other),
        }
    }
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
