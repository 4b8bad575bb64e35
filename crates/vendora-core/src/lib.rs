//! # vendora-core: Pure Business Logic for Vendora
//!
//! This crate is the **heart** of the Vendora commerce platform: the order
//! and cart monetary engine, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Vendora Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Storefront / Vendor Dashboard / Admin (Next.js)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ server actions / API                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Request Handlers                              │   │
//! │  │    add_to_cart, checkout, update_order_status, refund_item      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vendora-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌────────────┐  │   │
//! │  │   │   money   │  │  totals   │  │  status   │  │ commission │  │   │
//! │  │   │   Money   │  │ aggregate │  │ lifecycle │  │   split    │  │   │
//! │  │   │  Currency │  │  compose  │  │ validator │  │  refunds   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  Persistence (ORM / database)                    │   │
//! │  │    owns Cart/Order records, serializes concurrent writes        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - `Money` and `Currency`: integer minor units, no floats
//! - [`types`] - `CommissionRate` and the per-call `EngineConfig`
//! - [`cart`] - cart items and cart operations
//! - [`order`] - the order aggregate and its lifecycle gates
//! - [`totals`] - line-item aggregation and order total composition
//! - [`status`] - status enums and the transition graph
//! - [`commission`] - commission splits and refund proration
//! - [`error`] - domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same items in, byte-identical totals out
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here;
//!    callers own persistence and serialize writes to an order
//! 3. **Integer Money**: amounts are minor units (i64) tagged with an ISO
//!    currency; negative results clamp to zero by definition
//! 4. **Explicit Errors**: all failures are typed variants, never strings
//!    or panics; clamping is a normalization, not an error
//!
//! ## Example Usage
//!
//! ```rust
//! use vendora_core::cart::{Cart, CartItem};
//! use vendora_core::money::{Currency, Money};
//! use vendora_core::order::Order;
//! use vendora_core::types::{CommissionRate, EngineConfig};
//!
//! let mut cart = Cart::new("user-1", Currency::USD);
//! let item = CartItem::new("prod-1", "SKU-1", "Widget", Money::from_minor(2_500, Currency::USD), 2)?;
//! cart.add_item(item)?;
//!
//! let config = EngineConfig {
//!     default_commission_rate: CommissionRate::from_percent(15)?,
//!     gift_wrap_cost: Money::zero(Currency::USD),
//! };
//! let order = Order::from_cart(cart, &config, false)?;
//! assert_eq!(order.total_amount().minor(), 5_000);
//! # Ok::<(), vendora_core::error::CoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod commission;
pub mod error;
pub mod money;
pub mod order;
pub mod status;
pub mod totals;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vendora_core::Money` instead of
// `use vendora_core::money::Money`

pub use cart::{Cart, CartItem};
pub use commission::{split, split_after_refund, CommissionSplit, RefundSplit};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Currency, Money};
pub use order::{Order, OrderItem};
pub use status::{OrderState, OrderStatus, PaymentStatus};
pub use totals::{aggregate, compose, line_total, Charge, ItemAggregate, OrderCharges, OrderTotals};
pub use types::{CommissionRate, EngineConfig};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum unique items allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable order sizes.
/// Can be made configurable per-tenant in future versions.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Upper bound for commission rates, in basis points (100%)
pub const COMMISSION_RATE_MAX_BPS: u32 = 10_000;
