//! # Order Module
//!
//! The order aggregate: items, order-level adjustments, the recomputed
//! totals, and the lifecycle gates that guard every mutation.
//!
//! ## Engine Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Order Lifecycle & Total Flow                            │
//! │                                                                         │
//! │  Cart ──► Order::from_cart() ──► pending / pending                     │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  apply_transition() ──► status graph + payment correlation checks      │
//! │              │                                                          │
//! │              ├── payment becomes `paid` ──► commission split per item  │
//! │              │                                                          │
//! │              └── every transition ──► totals recomputed FRESH from     │
//! │                  the items - no cached total is ever trusted           │
//! │                                                                         │
//! │  mark_item_refunded() ──► splitter re-runs with refund proration       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `subtotal` and `total_amount` are private: the only way they change is
//! through [`Order::recompute_totals`], which derives them from the current
//! items. That is what keeps stored totals reconciled with the lines they
//! represent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartItem};
use crate::commission::{split, split_after_refund};
use crate::error::{CoreError, CoreResult};
use crate::money::{Currency, Money};
use crate::status::{
    apply_transition, validate_item_status, OrderState, OrderStatus, PaymentStatus,
};
use crate::totals::{aggregate, compose, line_total, Charge, OrderCharges, OrderTotals};
use crate::types::{CommissionRate, EngineConfig};

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
///
/// Carries the cart line's frozen snapshot plus the commission split and
/// refund bookkeeping. The computed money fields (`commission_amount`,
/// `seller_earning`, `refund_amount`) are private - they only change when
/// the splitter runs.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Unique identifier (UUID v4), minted at checkout.
    pub id: String,

    /// Product reference.
    pub product_id: String,

    /// Optional variant reference.
    pub variant_id: Option<String>,

    /// SKU at time of sale (frozen).
    pub sku: String,

    /// Product name at time of sale (frozen).
    pub name: String,

    /// Unit price at time of sale (frozen).
    pub unit_price: Money,

    /// Tax for this line.
    pub tax_amount: Money,

    /// Shipping for this line.
    pub shipping_amount: Money,

    /// Discount applied to this line.
    pub discount_amount: Money,

    /// Quantity sold.
    pub quantity: i64,

    /// Platform commission rate for this line.
    pub commission_rate: CommissionRate,

    /// Platform's cut of the line total (retained commission post-refund).
    commission_amount: Money,

    /// Amount remitted to the seller for this line.
    seller_earning: Money,

    /// Fulfillment status of this line, never ahead of the order's.
    status: OrderStatus,

    /// Whether the goods came back to the seller.
    is_returned: bool,

    /// Whether a refund was issued against this line.
    is_refunded: bool,

    /// Refunded amount, at most the line total.
    refund_amount: Option<Money>,
}

impl OrderItem {
    /// Builds an order item from a cart line, running the splitter once
    /// with the given commission rate.
    fn from_cart_item(item: CartItem, rate: CommissionRate) -> CoreResult<Self> {
        let lt = item.line_total()?;
        let s = split(lt, rate)?;
        Ok(OrderItem {
            id: Uuid::new_v4().to_string(),
            product_id: item.product_id,
            variant_id: item.variant_id,
            sku: item.sku,
            name: item.name,
            unit_price: item.unit_price,
            tax_amount: item.tax_amount,
            shipping_amount: item.shipping_amount,
            discount_amount: item.discount_amount,
            quantity: item.quantity,
            commission_rate: rate,
            commission_amount: s.commission,
            seller_earning: s.seller_earning,
            status: OrderStatus::Pending,
            is_returned: false,
            is_refunded: false,
            refund_amount: None,
        })
    }

    /// Projects this item into the aggregator's input record.
    pub fn charge(&self) -> Charge {
        Charge {
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax: self.tax_amount,
            shipping: self.shipping_amount,
            discount: self.discount_amount,
        }
    }

    /// The line total for this item.
    pub fn line_total(&self) -> CoreResult<Money> {
        line_total(&self.charge())
    }

    /// Platform's cut (retained commission once a refund was issued).
    pub fn commission_amount(&self) -> Money {
        self.commission_amount
    }

    /// Seller payout for this line.
    pub fn seller_earning(&self) -> Money {
        self.seller_earning
    }

    /// This line's fulfillment status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_returned(&self) -> bool {
        self.is_returned
    }

    pub fn is_refunded(&self) -> bool {
        self.is_refunded
    }

    /// Refunded amount, if a refund was issued.
    pub fn refund_amount(&self) -> Option<Money> {
        self.refund_amount
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order: a non-empty list of items plus order-level adjustments.
///
/// ## Invariants
/// - `items` is non-empty ([`CoreError::EmptyOrder`] guards creation)
/// - `total_amount` always equals the composer's output for the current
///   items and adjustments
/// - `status` / `payment_status` only change through the lifecycle
///   validator; terminal orders are immutable except audit metadata
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Buyer (or guest identity) the order belongs to.
    pub user_id: String,

    /// Currency every amount on this order is denominated in.
    #[ts(as = "String")]
    pub currency: Currency,

    /// Order lines. Non-empty.
    items: Vec<OrderItem>,

    /// Order-level shipping cost (on top of per-line shipping).
    pub shipping_cost: Money,

    /// Order-level tax (on top of per-line tax).
    pub tax: Money,

    /// Order-level discount (coupon, business discount). Applied last.
    pub discount_amount: Money,

    /// Gift wrap charge.
    pub gift_wrap_cost: Money,

    /// Σ unit_price × quantity, derived by the composer.
    subtotal: Money,

    /// The composed order total, derived by the composer.
    total_amount: Money,

    status: OrderStatus,

    payment_status: PaymentStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Converts a cart into a new `pending`/`pending` order, consuming the
    /// cart (a cart is destroyed on checkout).
    ///
    /// Item commission rates are seeded from the config's default; the
    /// gift wrap charge is taken from the config when `gift_wrap` is set.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyOrder`] for an empty cart
    /// - [`CoreError::CurrencyMismatch`] if the config's gift wrap charge
    ///   is not in the cart's currency
    pub fn from_cart(cart: Cart, config: &EngineConfig, gift_wrap: bool) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyOrder);
        }

        let currency = cart.currency;
        let zero = Money::zero(currency);
        let gift_wrap_cost = if gift_wrap {
            zero.checked_add(config.gift_wrap_cost)?
        } else {
            zero
        };

        let items = cart
            .items
            .into_iter()
            .map(|item| OrderItem::from_cart_item(item, config.default_commission_rate))
            .collect::<CoreResult<Vec<_>>>()?;

        let now = Utc::now();
        let mut order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: cart.user_id,
            currency,
            items,
            shipping_cost: zero,
            tax: zero,
            discount_amount: zero,
            gift_wrap_cost,
            subtotal: zero,
            total_amount: zero,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        order.recompute_totals()?;
        Ok(order)
    }

    /// The order lines.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Current (status, payment status) pair.
    pub fn state(&self) -> OrderState {
        OrderState {
            status: self.status,
            payment_status: self.payment_status,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Σ unit_price × quantity across the lines.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// The composed total. Always the composer's output for the current
    /// items - never independently set.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    fn order_charges(&self) -> OrderCharges {
        OrderCharges {
            shipping_cost: self.shipping_cost,
            tax: self.tax,
            gift_wrap_cost: self.gift_wrap_cost,
            discount: self.discount_amount,
        }
    }

    /// Recomputes `subtotal` and `total_amount` fresh from the current
    /// items and order-level adjustments, and returns the full record for
    /// the caller to persist.
    ///
    /// Idempotent: recomputing from unchanged items yields identical
    /// totals.
    pub fn recompute_totals(&mut self) -> CoreResult<OrderTotals> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        let charges: Vec<Charge> = self.items.iter().map(OrderItem::charge).collect();
        let agg = aggregate(&charges, self.currency)?;
        let totals = compose(&agg, &self.order_charges())?;
        self.subtotal = totals.subtotal;
        self.total_amount = totals.total;
        Ok(totals)
    }

    /// Applies a status transition through the lifecycle validator.
    ///
    /// Totals are recomputed fresh from the items on every transition (no
    /// cached total is trusted), and a transition that brings the payment
    /// to `paid` re-runs the commission splitter for every line.
    pub fn apply_transition(
        &mut self,
        requested_status: OrderStatus,
        requested_payment: PaymentStatus,
    ) -> CoreResult<OrderTotals> {
        let next = apply_transition(self.state(), requested_status, requested_payment)?;
        for item in &self.items {
            validate_item_status(next.status, item.status)?;
        }

        let finalizing =
            requested_payment == PaymentStatus::Paid && self.payment_status != PaymentStatus::Paid;
        if finalizing {
            for item in &mut self.items {
                let lt = line_total(&item.charge())?;
                let s = split(lt, item.commission_rate)?;
                item.commission_amount = s.commission;
                item.seller_earning = s.seller_earning;
            }
        }

        let totals = self.recompute_totals()?;
        self.status = next.status;
        self.payment_status = next.payment_status;
        self.updated_at = Utc::now();
        Ok(totals)
    }

    /// Moves a single line's status forward, constrained by the same
    /// transition graph and by the parent order's status.
    pub fn set_item_status(&mut self, item_id: &str, status: OrderStatus) -> CoreResult<()> {
        validate_item_status(self.status, status)?;
        let item = self.item_mut(item_id)?;
        if !item.status.can_transition_to(status) {
            return Err(CoreError::IllegalStatusTransition {
                from: item.status,
                to: status,
            });
        }
        item.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records a refund against one line and re-runs the splitter with
    /// refund proration.
    ///
    /// ## Errors
    /// - [`CoreError::ItemNotFound`] for an unknown item id
    /// - [`CoreError::RefundExceedsLineTotal`] when the refund is greater
    ///   than the line total
    pub fn mark_item_refunded(&mut self, item_id: &str, refund: Money) -> CoreResult<()> {
        let item = self.item_mut(item_id)?;
        let lt = line_total(&item.charge())?;
        let r = split_after_refund(lt, refund, item.commission_rate)?;

        item.is_refunded = true;
        item.refund_amount = Some(refund);
        item.commission_amount = r.commission_retained;
        item.seller_earning = r.seller_earning;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Flags one line as returned to the seller.
    pub fn mark_item_returned(&mut self, item_id: &str) -> CoreResult<()> {
        let item = self.item_mut(item_id)?;
        item.is_returned = true;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn item_mut(&mut self, item_id: &str) -> CoreResult<&mut OrderItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound {
                id: item_id.to_string(),
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::USD)
    }

    fn config(commission_pct: u32) -> EngineConfig {
        EngineConfig {
            default_commission_rate: CommissionRate::from_percent(commission_pct).unwrap(),
            gift_wrap_cost: usd(300),
        }
    }

    fn cart_with_one_line() -> Cart {
        // 2 × $25.00 + $2.50 tax + $5.00 shipping = $57.50
        let mut cart = Cart::new("user-1", Currency::USD);
        let item = CartItem::new("p1", "SKU-1", "Widget", usd(2_500), 2)
            .unwrap()
            .with_tax(usd(250))
            .unwrap()
            .with_shipping(usd(500))
            .unwrap();
        cart.add_item(item).unwrap();
        cart
    }

    #[test]
    fn test_checkout_creates_pending_order() {
        let order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert_eq!(order.subtotal().minor(), 5_000);
        assert_eq!(order.total_amount().minor(), 5_750);
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn test_empty_cart_cannot_checkout() {
        let cart = Cart::new("user-1", Currency::USD);
        assert!(matches!(
            Order::from_cart(cart, &config(15), false),
            Err(CoreError::EmptyOrder)
        ));
    }

    #[test]
    fn test_gift_wrap_charge_from_config() {
        let order = Order::from_cart(cart_with_one_line(), &config(15), true).unwrap();
        assert_eq!(order.gift_wrap_cost.minor(), 300);
        assert_eq!(order.total_amount().minor(), 6_050);
    }

    #[test]
    fn test_order_level_discount_clamps_total() {
        // Example 2: one line of 57.50, order-level discount 100.00 -> 0.00
        let mut order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        order.discount_amount = usd(10_000);
        let totals = order.recompute_totals().unwrap();
        assert!(totals.total.is_zero());
        assert!(order.total_amount().is_zero());
        // only 57.50 of the nominal 100.00 discount was deducted
        assert_eq!(totals.discount.minor(), 5_750);
    }

    #[test]
    fn test_totals_reconcile_after_recompute() {
        let mut order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        order.shipping_cost = usd(795);
        order.tax = usd(120);

        let first = order.recompute_totals().unwrap();
        let second = order.recompute_totals().unwrap();
        assert_eq!(first, second);
        assert_eq!(order.total_amount(), first.total);
        // 57.50 + 7.95 + 1.20
        assert_eq!(first.total.minor(), 6_665);
    }

    #[test]
    fn test_transition_gates_mutation() {
        let mut order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        order
            .apply_transition(OrderStatus::PaymentProcessing, PaymentStatus::Pending)
            .unwrap();
        order
            .apply_transition(OrderStatus::Confirmed, PaymentStatus::Paid)
            .unwrap();

        let err = order.apply_transition(OrderStatus::Pending, PaymentStatus::Paid);
        assert!(matches!(
            err,
            Err(CoreError::IllegalStatusTransition { .. })
        ));
        assert_eq!(order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_payment_capture_runs_splitter() {
        let mut order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        order
            .apply_transition(OrderStatus::Confirmed, PaymentStatus::Paid)
            .unwrap();

        let item = &order.items()[0];
        // line total 57.50 at 15% -> commission 8.63 (half-up), earning 48.87
        assert_eq!(item.commission_amount().minor(), 863);
        assert_eq!(item.seller_earning().minor(), 4_887);
        assert_eq!(
            item.commission_amount()
                .checked_add(item.seller_earning())
                .unwrap(),
            item.line_total().unwrap()
        );
    }

    #[test]
    fn test_delivery_requires_paid_payment() {
        let mut order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        order
            .apply_transition(OrderStatus::Confirmed, PaymentStatus::Paid)
            .unwrap();

        // Example 4: confirmed -> delivered with payment still pending
        let err = order.apply_transition(OrderStatus::Delivered, PaymentStatus::Pending);
        assert!(matches!(err, Err(CoreError::PaymentStatusMismatch { .. })));

        order
            .apply_transition(OrderStatus::Delivered, PaymentStatus::Paid)
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn test_item_status_bounded_by_order() {
        let mut order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        order
            .apply_transition(OrderStatus::Confirmed, PaymentStatus::Paid)
            .unwrap();
        let item_id = order.items()[0].id.clone();

        let err = order.set_item_status(&item_id, OrderStatus::Delivered);
        assert!(matches!(
            err,
            Err(CoreError::ItemStatusExceedsOrder { .. })
        ));

        order.set_item_status(&item_id, OrderStatus::Confirmed).unwrap();
        assert_eq!(order.items()[0].status(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_item_refund_prorates_commission() {
        // Example 5 on a $100.00 line at 15%
        let mut cart = Cart::new("user-1", Currency::USD);
        cart.add_item(CartItem::new("p1", "SKU-1", "Widget", usd(10_000), 1).unwrap())
            .unwrap();
        let mut order = Order::from_cart(cart, &config(15), false).unwrap();
        let item_id = order.items()[0].id.clone();

        order.mark_item_refunded(&item_id, usd(3_000)).unwrap();

        let item = &order.items()[0];
        assert!(item.is_refunded());
        assert_eq!(item.refund_amount().unwrap().minor(), 3_000);
        assert_eq!(item.commission_amount().minor(), 1_050); // 15.00 − 4.50
        assert_eq!(item.seller_earning().minor(), 5_950);
    }

    #[test]
    fn test_item_refund_bounded_by_line_total() {
        let mut order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        let item_id = order.items()[0].id.clone();

        let err = order.mark_item_refunded(&item_id, usd(100_000));
        assert!(matches!(
            err,
            Err(CoreError::RefundExceedsLineTotal { .. })
        ));
        assert!(!order.items()[0].is_refunded());
    }

    #[test]
    fn test_unknown_item_id() {
        let mut order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        assert!(matches!(
            order.mark_item_returned("ghost"),
            Err(CoreError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_full_refund_flow() {
        let mut order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        order
            .apply_transition(OrderStatus::Delivered, PaymentStatus::Paid)
            .unwrap();
        order
            .apply_transition(OrderStatus::RefundRequested, PaymentStatus::Paid)
            .unwrap();
        let item_id = order.items()[0].id.clone();
        order.mark_item_returned(&item_id).unwrap();
        assert!(order.items()[0].is_returned());

        order
            .apply_transition(OrderStatus::Refunded, PaymentStatus::Refunded)
            .unwrap();

        // terminal: nothing moves anymore
        let err = order.apply_transition(OrderStatus::Refunded, PaymentStatus::Refunded);
        assert!(matches!(
            err,
            Err(CoreError::IllegalStatusTransition { .. })
        ));
    }

    #[test]
    fn test_order_serializes_with_camel_case_totals() {
        let order = Order::from_cart(cart_with_one_line(), &config(15), false).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["totalAmount"]["minor"], 5_750);
        assert_eq!(json["totalAmount"]["currency"], "USD");
        assert_eq!(json["status"], "pending");
    }
}
