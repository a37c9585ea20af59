//! Collaborator boundaries consumed by the orchestrator, with in-memory
//! implementations.

pub mod catalog;
pub mod payment;

use std::time::Duration;

use thiserror::Error;

pub use catalog::{CatalogLookup, InMemoryCatalog};
pub use payment::{InMemoryPaymentClient, PaymentClient, PaymentRecord};

/// Errors returned by external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The collaborator could not be reached or failed internally.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The collaborator refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The call did not complete within its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
