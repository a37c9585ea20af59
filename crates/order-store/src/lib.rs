//! Order repository for the order service.
//!
//! Provides the `OrderRepository` contract plus two backends: an in-memory
//! map for tests and local runs, and a PostgreSQL table for production.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use common::{OrderId, Version};
pub use error::{RepositoryError, Result};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use repository::{OrderRepository, OrderRepositoryExt};
