//! Shared types for the order service workspace.

mod types;
mod version;

pub use types::{OrderId, PartId, TransactionId, UserId};
pub use version::Version;
