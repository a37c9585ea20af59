//! Domain layer for the order service.
//!
//! This crate provides:
//! - The `Order` entity with its creation invariants
//! - The `OrderStatus` state machine (pending, paid, cancelled, fulfilled)
//! - `Money` and `Part` value objects

pub mod order;

pub use order::{
    Money, Order, OrderError, OrderRecord, OrderStatus, ParseOrderStatusError, Part,
};
