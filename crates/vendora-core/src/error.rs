//! # Error Types
//!
//! Domain-specific error types for vendora-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vendora-core errors (this file)                                       │
//! │  ├── CoreError        - Monetary / lifecycle rule violations           │
//! │  └── ValidationError  - Field-level input validation failures          │
//! │                                                                         │
//! │  Consumer layers translate these into API / form errors:               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → handler → form error → Frontend   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (currencies, statuses, amounts)
//! 3. Errors are enum variants, never String
//! 4. Clamping negative money to zero is NOT an error - it is a defined
//!    normalization (see [`crate::money::Money`])

use thiserror::Error;

use crate::money::{Currency, Money};
use crate::status::{OrderStatus, PaymentStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent monetary or lifecycle rule violations. They are
/// returned as typed failures to the immediate caller; the request handler
/// decides whether to surface them as a form error or abort the request.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two amounts of different currencies were combined.
    ///
    /// The engine performs no currency conversion - every amount that takes
    /// part in one computation must already share a currency.
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// Quantity is zero or negative.
    ///
    /// Quantities are rejected, not clamped - unlike monetary values, a
    /// non-positive quantity is always a caller bug.
    #[error("Invalid quantity {quantity}: must be a positive integer")]
    InvalidQuantity { quantity: i64 },

    /// Order creation was attempted from zero items.
    ///
    /// An empty cart is valid (its aggregate is all zeros), but an order
    /// must aggregate a non-empty item list.
    #[error("Cannot create an order from an empty cart")]
    EmptyOrder,

    /// Requested order-status transition is not on the allowed graph.
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Order status and payment status combination violates the
    /// correlation rule (e.g. `delivered` with an unpaid payment status).
    #[error("Order status {status} is inconsistent with payment status {payment_status}")]
    PaymentStatusMismatch {
        status: OrderStatus,
        payment_status: PaymentStatus,
    },

    /// An item's status is ranked ahead of its parent order's status.
    ///
    /// An item cannot be `delivered` while its order is still `confirmed`.
    #[error("Item status {item_status} is ahead of order status {order_status}")]
    ItemStatusExceedsOrder {
        item_status: OrderStatus,
        order_status: OrderStatus,
    },

    /// Commission rate is outside the closed range 0..=100%.
    #[error("Invalid commission rate: {bps} bps is outside 0..=10000")]
    InvalidCommissionRate { bps: u32 },

    /// Refund amount is greater than the refundable line total.
    #[error("Refund {refund} exceeds line total {line_total}")]
    RefundExceedsLineTotal { refund: Money, line_total: Money },

    /// Cart has exceeded maximum allowed unique items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Referenced item is not present in the cart/order.
    #[error("Item {id} not found")]
    ItemNotFound { id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a field value does not meet requirements, before any
/// business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g. a malformed currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
