//! Order state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::OrderError;

/// The status of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Paid ──► Fulfilled (external)
///           │
///           └──► Cancelled
/// ```
///
/// Only `Pending` orders can be paid or cancelled. `Cancelled` and
/// `Fulfilled` are terminal; nothing ever moves an order back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order is priced and awaiting payment.
    #[default]
    Pending,

    /// Payment has been captured.
    Paid,

    /// Order was cancelled before payment (terminal state).
    Cancelled,

    /// Order was fulfilled by the downstream fulfillment process (terminal state).
    Fulfilled,
}

impl OrderStatus {
    /// Returns true if the order can be paid in this status.
    pub fn can_pay(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be cancelled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Fulfilled)
    }

    /// Checks that the order is still pending.
    ///
    /// Pay and cancel share the same gate, so a non-pending status maps onto
    /// the conflict error for that status.
    pub fn ensure_pending(&self) -> Result<(), OrderError> {
        match self {
            OrderStatus::Pending => Ok(()),
            OrderStatus::Paid => Err(OrderError::AlreadyPaid),
            OrderStatus::Cancelled => Err(OrderError::Cancelled),
            OrderStatus::Fulfilled => Err(OrderError::Fulfilled),
        }
    }

    /// Returns the wire/storage name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Fulfilled => "FULFILLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a stored status string is not one of the known statuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            "FULFILLED" => Ok(OrderStatus::Fulfilled),
            other => Err(ParseOrderStatusError(other.to_string())),
        }
    }
}
