//! Order lifecycle orchestration.
//!
//! This crate drives an order through its lifecycle:
//! 1. Create: price the requested parts through the catalog and store a pending order
//! 2. Pay: charge the user through the payment gateway and mark the order paid
//! 3. Cancel: move a pending order to cancelled
//!
//! Outbound calls are bounded by the deadlines in [`OrchestratorConfig`], and
//! pay/cancel on the same order never interleave.

pub mod config;
pub mod error;
pub mod locks;
pub mod orchestrator;
pub mod services;

pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, Result};
pub use locks::{OrderLockGuard, OrderLocks};
pub use orchestrator::OrderOrchestrator;
pub use services::{
    CatalogLookup, InMemoryCatalog, InMemoryPaymentClient, PaymentClient, PaymentRecord,
    ServiceError,
};
