//! Order entity and related types.

mod entity;
mod state;
mod value_objects;

pub use entity::{Order, OrderRecord};
pub use state::{OrderStatus, ParseOrderStatusError};
pub use value_objects::{Money, Part};

use thiserror::Error;

/// Errors raised by the order entity itself.
///
/// Validation errors (`PartsNotSpecified`, `PaymentMethodRequired`, and the
/// total checks) are caller mistakes; the status errors are conflicts with
/// the order's current lifecycle state and are never retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// An order needs at least one part.
    #[error("At least one part must be specified")]
    PartsNotSpecified,

    /// Paying requires a payment method.
    #[error("Payment method required")]
    PaymentMethodRequired,

    /// The computed total was negative.
    #[error("Invalid total price: {total_price}")]
    NegativeTotal { total_price: Money },

    /// The summed part prices do not fit in a `Money` amount.
    #[error("Order total exceeds the supported range")]
    TotalOverflow,

    /// The order has already been paid.
    #[error("Order already paid")]
    AlreadyPaid,

    /// The order has been cancelled.
    #[error("Order cancelled")]
    Cancelled,

    /// The order has been fulfilled.
    #[error("Order fulfilled")]
    Fulfilled,
}

impl OrderError {
    /// Returns true for errors caused by the order's current status.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            OrderError::AlreadyPaid | OrderError::Cancelled | OrderError::Fulfilled
        )
    }
}
