//! Integration tests for the Order entity.
//!
//! These tests walk the full pay/cancel transition table and check the
//! entity's invariants after every attempted transition.

use common::{PartId, TransactionId, UserId, Version};
use domain::{Money, Order, OrderError, OrderRecord, OrderStatus};

fn order_in(status: OrderStatus) -> Order {
    let base = Order::new(
        UserId::new(),
        vec![PartId::new(), PartId::new()],
        Money::from_cents(30_000),
    )
    .unwrap();

    let (payment_method, transaction_id) = match status {
        OrderStatus::Paid => (Some("CARD".to_string()), Some(TransactionId::new())),
        _ => (None, None),
    };

    Order::restore(OrderRecord {
        id: base.id(),
        user_id: base.user_id(),
        part_ids: base.part_ids().to_vec(),
        total_price: base.total_price(),
        status,
        payment_method,
        transaction_id,
        version: Version::new(2),
        created_at: base.created_at(),
        updated_at: base.updated_at(),
    })
}

fn assert_invariants(order: &Order) {
    assert!(!order.part_ids().is_empty());
    assert!(!order.total_price().is_negative());
    assert_eq!(
        order.transaction_id().is_some(),
        order.status() == OrderStatus::Paid,
        "transaction id must be present iff paid"
    );
}

mod transition_table {
    use super::*;

    #[test]
    fn pay_transitions() {
        let cases = [
            (OrderStatus::Pending, None),
            (OrderStatus::Paid, Some(OrderError::AlreadyPaid)),
            (OrderStatus::Cancelled, Some(OrderError::Cancelled)),
            (OrderStatus::Fulfilled, Some(OrderError::Fulfilled)),
        ];

        for (status, expected_error) in cases {
            let mut order = order_in(status);
            let before = order.clone();
            let result = order.mark_paid("CARD", TransactionId::new());

            match expected_error {
                None => {
                    assert!(result.is_ok(), "pay from {status} should succeed");
                    assert_eq!(order.status(), OrderStatus::Paid);
                }
                Some(err) => {
                    assert_eq!(result, Err(err), "pay from {status}");
                    assert_eq!(order, before, "failed pay must not mutate");
                }
            }
            assert_invariants(&order);
        }
    }

    #[test]
    fn cancel_transitions() {
        let cases = [
            (OrderStatus::Pending, None),
            (OrderStatus::Paid, Some(OrderError::AlreadyPaid)),
            (OrderStatus::Cancelled, Some(OrderError::Cancelled)),
            (OrderStatus::Fulfilled, Some(OrderError::Fulfilled)),
        ];

        for (status, expected_error) in cases {
            let mut order = order_in(status);
            let before = order.clone();
            let result = order.cancel();

            match expected_error {
                None => {
                    assert!(result.is_ok(), "cancel from {status} should succeed");
                    assert_eq!(order.status(), OrderStatus::Cancelled);
                }
                Some(err) => {
                    assert_eq!(result, Err(err), "cancel from {status}");
                    assert_eq!(order, before, "failed cancel must not mutate");
                }
            }
            assert_invariants(&order);
        }
    }

    #[test]
    fn nothing_returns_to_pending() {
        for status in [
            OrderStatus::Paid,
            OrderStatus::Cancelled,
            OrderStatus::Fulfilled,
        ] {
            let mut order = order_in(status);
            let _ = order.mark_paid("CARD", TransactionId::new());
            let _ = order.cancel();
            assert_ne!(order.status(), OrderStatus::Pending);
        }
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn cancel_then_pay_reports_cancelled() {
        let mut order = order_in(OrderStatus::Pending);
        order.cancel().unwrap();

        let err = order.mark_paid("CARD", TransactionId::new()).unwrap_err();
        assert_eq!(err, OrderError::Cancelled);
        assert!(err.is_conflict());
        assert_invariants(&order);
    }

    #[test]
    fn pay_then_cancel_reports_already_paid() {
        let mut order = order_in(OrderStatus::Pending);
        let tx = TransactionId::new();
        order.mark_paid("CARD", tx).unwrap();

        assert_eq!(order.cancel(), Err(OrderError::AlreadyPaid));
        assert_eq!(order.transaction_id(), Some(tx));
        assert_invariants(&order);
    }

    #[test]
    fn validation_errors_are_not_conflicts() {
        assert!(!OrderError::PartsNotSpecified.is_conflict());
        assert!(!OrderError::PaymentMethodRequired.is_conflict());
    }
}
