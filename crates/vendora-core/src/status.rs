//! # Status Lifecycle Module
//!
//! Order/payment status enums and the transition rules that gate every
//! order mutation.
//!
//! ## Transition Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Status Lifecycle                             │
//! │                                                                         │
//! │  Main path (ranked, forward-only):                                     │
//! │                                                                         │
//! │  pending ─► payment_processing ─► confirmed ─► shipping_soon           │
//! │     │              │                  │             │                   │
//! │     │              │                  │             │    ┌───────────┐ │
//! │     └──────────────┴──────────────────┴─────────────┴──► │ cancelled │ │
//! │                                              (pre-shipped only)        │
//! │                                                          └───────────┘ │
//! │  shipping_soon ─► shipped ─► out_for_delivery ─► delivered             │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                                              refund_requested          │
//! │                                                      │                  │
//! │                                          ┌───────────┴───────────┐     │
//! │                                          ▼                       ▼     │
//! │                                      refunded               returned   │
//! │                                                                         │
//! │  Terminal (no outgoing edges): cancelled, refunded, returned           │
//! │  Forward skips are legal: confirmed ─► shipped is fine                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why an explicit rank table?
//! Statuses were historically compared as strings in ad hoc call sites.
//! A closed enum with a rank table makes the graph exhaustive: adding a
//! state forces every `match` below to be revisited by the compiler.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Order Status
// =============================================================================

/// The fulfillment status of an order (and, independently, of each item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created from a cart, payment not yet started.
    Pending,
    /// Payment is being processed by the payment provider.
    PaymentProcessing,
    /// Payment accepted, order confirmed to the buyer.
    Confirmed,
    /// Seller is preparing the shipment.
    ShippingSoon,
    /// Handed to the carrier.
    Shipped,
    /// Carrier is delivering today.
    OutForDelivery,
    /// Received by the buyer.
    Delivered,
    /// Cancelled before shipping (terminal).
    Cancelled,
    /// Buyer asked for a refund after delivery.
    RefundRequested,
    /// Refund issued (terminal).
    Refunded,
    /// Goods returned to the seller (terminal).
    Returned,
}

impl OrderStatus {
    /// Position on the main fulfillment path, `None` for side branches.
    pub const fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::PaymentProcessing => Some(1),
            OrderStatus::Confirmed => Some(2),
            OrderStatus::ShippingSoon => Some(3),
            OrderStatus::Shipped => Some(4),
            OrderStatus::OutForDelivery => Some(5),
            OrderStatus::Delivered => Some(6),
            OrderStatus::Cancelled
            | OrderStatus::RefundRequested
            | OrderStatus::Refunded
            | OrderStatus::Returned => None,
        }
    }

    /// Terminal statuses have no further legal forward transition.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Cancelled | OrderStatus::Refunded | OrderStatus::Returned
        )
    }

    /// Checks whether `target` is reachable from this status.
    ///
    /// ## Rules
    /// - Terminal statuses have no outgoing edges (not even self)
    /// - Re-asserting the current non-terminal status is a legal no-op
    /// - On the main path, any target with rank >= current rank is legal
    ///   (skipping intermediate states is allowed)
    /// - Side branches: `cancelled` from any pre-`shipped` state,
    ///   `refund_requested` from `delivered`, `refunded`/`returned` from
    ///   `refund_requested` or `delivered`
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if *self == target {
            return true;
        }

        match target {
            OrderStatus::Cancelled => {
                // Reachable from any state before the goods ship.
                matches!(self.rank(), Some(rank) if rank < 4)
            }
            OrderStatus::RefundRequested => *self == OrderStatus::Delivered,
            OrderStatus::Refunded | OrderStatus::Returned => {
                matches!(self, OrderStatus::RefundRequested | OrderStatus::Delivered)
            }
            _ => match (self.rank(), target.rank()) {
                (Some(from), Some(to)) => to >= from,
                // No path from a side branch back onto the main path.
                _ => false,
            },
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PaymentProcessing => "payment_processing",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::ShippingSoon => "shipping_soon",
            OrderStatus::Shipped => "shipped",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::RefundRequested => "refund_requested",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Returned => "returned",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// The payment status of an order, tracked alongside the order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No payment captured yet.
    Pending,
    /// Fully captured.
    Paid,
    /// Capture attempt failed.
    Failed,
    /// Fully refunded (terminal).
    Refunded,
    /// Part of the payment was refunded (item-level refunds).
    PartiallyRefunded,
}

impl PaymentStatus {
    /// A fully refunded payment admits no further payment activity.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Refunded)
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Correlation Rule
// =============================================================================

/// Checks the order-status / payment-status correlation on a write.
///
/// ## Rules
/// - `delivered` requires `paid` or `partially_refunded`
/// - `refunded` / `returned` require `refunded` or `partially_refunded`
/// - `pending` / `payment_processing` / `confirmed` permit any
///   non-terminal payment status
/// - shipping states and the remaining side branches are unconstrained
pub const fn payment_consistent(status: OrderStatus, payment: PaymentStatus) -> bool {
    match status {
        OrderStatus::Delivered => {
            matches!(payment, PaymentStatus::Paid | PaymentStatus::PartiallyRefunded)
        }
        OrderStatus::Refunded | OrderStatus::Returned => matches!(
            payment,
            PaymentStatus::Refunded | PaymentStatus::PartiallyRefunded
        ),
        OrderStatus::Pending | OrderStatus::PaymentProcessing | OrderStatus::Confirmed => {
            !payment.is_terminal()
        }
        OrderStatus::ShippingSoon
        | OrderStatus::Shipped
        | OrderStatus::OutForDelivery
        | OrderStatus::Cancelled
        | OrderStatus::RefundRequested => true,
    }
}

// =============================================================================
// Order State & Transition
// =============================================================================

/// The (order status, payment status) pair an order is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderState {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl OrderState {
    /// The state a freshly checked-out order starts in.
    pub const fn new() -> Self {
        OrderState {
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
        }
    }
}

impl Default for OrderState {
    fn default() -> Self {
        OrderState::new()
    }
}

/// Validates a requested transition and returns the new state.
///
/// This is the single gate for order state mutation: the transition graph
/// is checked first, then the correlation rule on the requested pair.
///
/// ## Example
/// ```rust
/// use vendora_core::status::{apply_transition, OrderState, OrderStatus, PaymentStatus};
///
/// let state = OrderState::new(); // pending / pending
/// let next = apply_transition(state, OrderStatus::Confirmed, PaymentStatus::Paid).unwrap();
/// assert_eq!(next.status, OrderStatus::Confirmed);
/// ```
pub fn apply_transition(
    current: OrderState,
    requested_status: OrderStatus,
    requested_payment: PaymentStatus,
) -> CoreResult<OrderState> {
    if !current.status.can_transition_to(requested_status) {
        return Err(CoreError::IllegalStatusTransition {
            from: current.status,
            to: requested_status,
        });
    }
    if !payment_consistent(requested_status, requested_payment) {
        return Err(CoreError::PaymentStatusMismatch {
            status: requested_status,
            payment_status: requested_payment,
        });
    }
    Ok(OrderState {
        status: requested_status,
        payment_status: requested_payment,
    })
}

/// Checks that an item status is not ahead of its parent order's status.
///
/// Only main-path ranks are compared; an individually cancelled or
/// refunded item is exempt (side branches carry no rank).
pub fn validate_item_status(
    order_status: OrderStatus,
    item_status: OrderStatus,
) -> CoreResult<()> {
    if let (Some(order_rank), Some(item_rank)) = (order_status.rank(), item_status.rank()) {
        if item_rank > order_rank {
            return Err(CoreError::ItemStatusExceedsOrder {
                item_status,
                order_status,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_path_is_monotonic() {
        // pending -> payment_processing -> confirmed -> shipped -> delivered
        // succeeds at every step (skips allowed)
        let steps = [
            (OrderStatus::Pending, PaymentStatus::Pending),
            (OrderStatus::PaymentProcessing, PaymentStatus::Pending),
            (OrderStatus::Confirmed, PaymentStatus::Paid),
            (OrderStatus::Shipped, PaymentStatus::Paid),
            (OrderStatus::Delivered, PaymentStatus::Paid),
        ];
        let mut state = OrderState::new();
        for (status, payment) in steps {
            state = apply_transition(state, status, payment).unwrap();
        }
        assert_eq!(state.status, OrderStatus::Delivered);
    }

    #[test]
    fn test_no_backward_transition() {
        let state = OrderState {
            status: OrderStatus::Delivered,
            payment_status: PaymentStatus::Paid,
        };
        let err = apply_transition(state, OrderStatus::Pending, PaymentStatus::Pending);
        assert!(matches!(
            err,
            Err(CoreError::IllegalStatusTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            })
        ));
    }

    #[test]
    fn test_cancel_only_before_shipped() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::ShippingSoon.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_refund_branch() {
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::RefundRequested));
        assert!(OrderStatus::RefundRequested.can_transition_to(OrderStatus::Refunded));
        assert!(OrderStatus::RefundRequested.can_transition_to(OrderStatus::Returned));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Refunded));

        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::RefundRequested));
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Refunded));
        // no path back onto the main path
        assert!(!OrderStatus::RefundRequested.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        for terminal in [
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
            OrderStatus::Returned,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(OrderStatus::Pending));
            assert!(!terminal.can_transition_to(terminal));
        }
    }

    #[test]
    fn test_same_status_is_a_noop() {
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::RefundRequested.can_transition_to(OrderStatus::RefundRequested));
    }

    #[test]
    fn test_delivered_requires_paid() {
        // Example 4: confirmed -> delivered with paymentStatus=pending
        let state = OrderState {
            status: OrderStatus::Confirmed,
            payment_status: PaymentStatus::Pending,
        };
        let err = apply_transition(state, OrderStatus::Delivered, PaymentStatus::Pending);
        assert!(matches!(
            err,
            Err(CoreError::PaymentStatusMismatch {
                status: OrderStatus::Delivered,
                payment_status: PaymentStatus::Pending,
            })
        ));

        assert!(payment_consistent(
            OrderStatus::Delivered,
            PaymentStatus::PartiallyRefunded
        ));
    }

    #[test]
    fn test_refunded_requires_refunded_payment() {
        assert!(!payment_consistent(OrderStatus::Refunded, PaymentStatus::Paid));
        assert!(payment_consistent(
            OrderStatus::Refunded,
            PaymentStatus::Refunded
        ));
        assert!(payment_consistent(
            OrderStatus::Returned,
            PaymentStatus::PartiallyRefunded
        ));
    }

    #[test]
    fn test_early_statuses_reject_terminal_payment() {
        assert!(!payment_consistent(
            OrderStatus::Pending,
            PaymentStatus::Refunded
        ));
        assert!(payment_consistent(OrderStatus::Confirmed, PaymentStatus::Paid));
        assert!(payment_consistent(
            OrderStatus::PaymentProcessing,
            PaymentStatus::Failed
        ));
    }

    #[test]
    fn test_item_status_cannot_exceed_order() {
        // item delivered while order still confirmed
        let err = validate_item_status(OrderStatus::Confirmed, OrderStatus::Delivered);
        assert!(matches!(
            err,
            Err(CoreError::ItemStatusExceedsOrder { .. })
        ));

        assert!(validate_item_status(OrderStatus::Shipped, OrderStatus::Confirmed).is_ok());
        assert!(validate_item_status(OrderStatus::Shipped, OrderStatus::Shipped).is_ok());
        // side-branch item statuses carry no rank and are exempt
        assert!(validate_item_status(OrderStatus::Confirmed, OrderStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
        let json = serde_json::to_string(&PaymentStatus::PartiallyRefunded).unwrap();
        assert_eq!(json, "\"partially_refunded\"");
    }
}
