//! # Totals Module
//!
//! The line-item aggregator and the order total composer - the only code
//! paths that may produce a persistable total.
//!
//! ## Computation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Total Recomputation Pipeline                           │
//! │                                                                         │
//! │  items ──► line_total() per item ──► aggregate() ──► compose()         │
//! │                                                                         │
//! │  line_total  = clamp0(unit_price × qty + tax + shipping − discount)    │
//! │  aggregate   = Σ subtotal / Σ tax / Σ shipping / Σ discount / Σ line   │
//! │  composed    = clamp0(Σ line + shipping_cost + tax + gift_wrap         │
//! │                       − order_discount)                                 │
//! │                                                                         │
//! │  Item-level discounts apply inside line_total; the order-level         │
//! │  discount applies LAST and clamps - it never goes negative and         │
//! │  never carries over.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Reconciliation Invariant
//! `Order.total_amount` is never independently settable. Every recompute
//! path goes through [`compose`], so a stored total always reconciles with
//! the line items it represents. The pipeline is pure: same items in,
//! byte-identical totals out.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Currency, Money};

// =============================================================================
// Charge (aggregator input record)
// =============================================================================

/// The monetary facts of one cart/order line, as supplied by the
/// persistence collaborator.
///
/// Both `CartItem` and `OrderItem` project into this record, so cart
/// preview totals and order totals run through the identical arithmetic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    /// Units purchased. Must be a positive integer.
    pub quantity: i64,
    /// Price per unit, frozen at add-to-cart time.
    pub unit_price: Money,
    /// Tax charged on this line.
    pub tax: Money,
    /// Shipping charged on this line.
    pub shipping: Money,
    /// Discount applied to this line.
    pub discount: Money,
}

impl Charge {
    /// A charge with no tax, shipping or discount.
    pub fn bare(quantity: i64, unit_price: Money) -> Self {
        let zero = Money::zero(unit_price.currency());
        Charge {
            quantity,
            unit_price,
            tax: zero,
            shipping: zero,
            discount: zero,
        }
    }
}

// =============================================================================
// Line-Item Aggregator
// =============================================================================

/// Computes a single line total:
/// `clamp0(unit_price × quantity + tax + shipping − discount)`.
///
/// ## Errors
/// - [`CoreError::InvalidQuantity`] for `quantity <= 0` - quantities are
///   rejected, not clamped, which distinguishes a caller bug from the
///   silent monetary clamp
/// - [`CoreError::CurrencyMismatch`] when the charge mixes currencies
///
/// ## Example
/// ```rust
/// use vendora_core::money::{Currency, Money};
/// use vendora_core::totals::{line_total, Charge};
///
/// // 2 × $25.00 + $2.50 tax + $5.00 shipping − $0 = $57.50
/// let charge = Charge {
///     quantity: 2,
///     unit_price: Money::from_minor(2_500, Currency::USD),
///     tax: Money::from_minor(250, Currency::USD),
///     shipping: Money::from_minor(500, Currency::USD),
///     discount: Money::zero(Currency::USD),
/// };
/// assert_eq!(line_total(&charge).unwrap().minor(), 5_750);
/// ```
pub fn line_total(charge: &Charge) -> CoreResult<Money> {
    Ok(charge_components(charge)?.1)
}

/// The pre-discount gross and the clamped line total of one charge.
///
/// The gap between the two is the discount actually deducted from the
/// line, which is what the aggregate reports.
fn charge_components(charge: &Charge) -> CoreResult<(Money, Money)> {
    if charge.quantity <= 0 {
        return Err(CoreError::InvalidQuantity {
            quantity: charge.quantity,
        });
    }
    let gross = charge
        .unit_price
        .multiply_quantity(charge.quantity)
        .checked_add(charge.tax)?
        .checked_add(charge.shipping)?;
    let line = gross.saturating_sub(charge.discount)?;
    Ok((gross, line))
}

/// The sums a batch of lines folds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemAggregate {
    /// Σ unit_price × quantity.
    pub subtotal: Money,
    /// Σ per-line tax.
    pub tax: Money,
    /// Σ per-line shipping.
    pub shipping: Money,
    /// Σ per-line discount actually deducted (a discount larger than its
    /// line contributes only what the line absorbed).
    pub discount: Money,
    /// Σ line totals (each already clamped at zero).
    pub total: Money,
}

impl ItemAggregate {
    /// The identity aggregate: all zeros in the given currency.
    ///
    /// An empty cart folds to this, by design - emptiness only becomes an
    /// error when an order is created from it.
    pub const fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        ItemAggregate {
            subtotal: zero,
            tax: zero,
            shipping: zero,
            discount: zero,
            total: zero,
        }
    }
}

/// Folds a sequence of charges into an [`ItemAggregate`].
///
/// Every charge must be denominated in `currency`; an empty slice yields
/// the all-zeros identity rather than an error.
pub fn aggregate(charges: &[Charge], currency: Currency) -> CoreResult<ItemAggregate> {
    let mut agg = ItemAggregate::zero(currency);
    for charge in charges {
        // Validates quantity and per-line currencies before any sum moves.
        let (gross, line) = charge_components(charge)?;
        agg.subtotal = agg
            .subtotal
            .checked_add(charge.unit_price.multiply_quantity(charge.quantity))?;
        agg.tax = agg.tax.checked_add(charge.tax)?;
        agg.shipping = agg.shipping.checked_add(charge.shipping)?;
        // The discount the line actually absorbed, not the nominal amount.
        agg.discount = agg.discount.checked_add(gross.saturating_sub(line)?)?;
        agg.total = agg.total.checked_add(line)?;
    }
    Ok(agg)
}

// =============================================================================
// Order Total Composer
// =============================================================================

/// Order-level adjustments applied on top of the item aggregate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderCharges {
    /// Order-level shipping cost (on top of any per-line shipping).
    pub shipping_cost: Money,
    /// Order-level tax (on top of any per-line tax).
    pub tax: Money,
    /// Gift wrap charge.
    pub gift_wrap_cost: Money,
    /// Order-level discount (coupon, business discount). Applied last.
    pub discount: Money,
}

impl OrderCharges {
    /// No order-level adjustments.
    pub const fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        OrderCharges {
            shipping_cost: zero,
            tax: zero,
            gift_wrap_cost: zero,
            discount: zero,
        }
    }
}

/// The recomputed totals record handed back to the caller for persistence.
///
/// Component fields combine item-level and order-level amounts so the
/// record is directly displayable; `total` follows the composer formula
/// and is the only value allowed into `Order.total_amount`. `discount`
/// reports what was actually deducted after clamping, so the record's
/// components always reconcile with `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub discount: Money,
    pub gift_wrap: Money,
    pub total: Money,
}

/// Composes the final order total:
/// `clamp0(aggregate.total + shipping_cost + tax + gift_wrap − discount)`.
///
/// The order-level discount is applied last, directly against the
/// pre-discount composed sum. A discount larger than that sum zeroes the
/// total; it never goes negative and never carries over.
///
/// ## Errors
/// [`CoreError::CurrencyMismatch`] when any component is denominated in a
/// different currency from the aggregate.
pub fn compose(agg: &ItemAggregate, order: &OrderCharges) -> CoreResult<OrderTotals> {
    let pre_discount = agg
        .total
        .checked_add(order.shipping_cost)?
        .checked_add(order.tax)?
        .checked_add(order.gift_wrap_cost)?;
    let total = pre_discount.saturating_sub(order.discount)?;
    // What the order-level discount actually removed: equal to the nominal
    // discount unless the total clamped at zero.
    let applied_discount = pre_discount.saturating_sub(total)?;

    Ok(OrderTotals {
        subtotal: agg.subtotal,
        tax: agg.tax.checked_add(order.tax)?,
        shipping: agg.shipping.checked_add(order.shipping_cost)?,
        discount: agg.discount.checked_add(applied_discount)?,
        gift_wrap: order.gift_wrap_cost,
        total,
    })
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

    fn charge(qty: i64, unit: i64, tax: i64, shipping: i64, discount: i64) -> Charge {
        Charge {
            quantity: qty,
            unit_price: usd(unit),
            tax: usd(tax),
            shipping: usd(shipping),
            discount: usd(discount),
        }
    }

    #[test]
    fn test_line_total_example() {
        // Example 1: {qty: 2, unit: 25.00, tax: 2.50, shipping: 5.00, discount: 0}
        let total = line_total(&charge(2, 2_500, 250, 500, 0)).unwrap();
        assert_eq!(total.minor(), 5_750); // $57.50
    }

    #[test]
    fn test_bare_charge_is_just_price_times_quantity() {
        let total = line_total(&Charge::bare(3, usd(1_099))).unwrap();
        assert_eq!(total.minor(), 3_297);
    }

    #[test]
    fn test_line_total_clamps_oversized_discount() {
        // discount exceeds the line: clamps to zero, silently
        let total = line_total(&charge(1, 1_000, 0, 0, 5_000)).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_line_total_rejects_bad_quantity() {
        assert!(matches!(
            line_total(&charge(0, 1_000, 0, 0, 0)),
            Err(CoreError::InvalidQuantity { quantity: 0 })
        ));
        assert!(matches!(
            line_total(&charge(-3, 1_000, 0, 0, 0)),
            Err(CoreError::InvalidQuantity { quantity: -3 })
        ));
    }

    #[test]
    fn test_line_total_currency_mismatch() {
        let mut bad = charge(1, 1_000, 0, 0, 0);
        bad.tax = Money::from_minor(100, Currency::EUR);
        assert!(matches!(
            line_total(&bad),
            Err(CoreError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_aggregate_empty_is_identity() {
        let agg = aggregate(&[], Currency::USD).unwrap();
        assert_eq!(agg, ItemAggregate::zero(Currency::USD));
        assert!(agg.total.is_zero());
    }

    #[test]
    fn test_aggregate_sums_components() {
        let agg = aggregate(
            &[charge(2, 2_500, 250, 500, 0), charge(1, 1_000, 100, 0, 200)],
            Currency::USD,
        )
        .unwrap();
        assert_eq!(agg.subtotal.minor(), 6_000); // 2×25 + 10
        assert_eq!(agg.tax.minor(), 350);
        assert_eq!(agg.shipping.minor(), 500);
        assert_eq!(agg.discount.minor(), 200);
        assert_eq!(agg.total.minor(), 5_750 + 900);
    }

    #[test]
    fn test_aggregate_reports_applied_line_discount() {
        // a line discount larger than its line counts only for what it removed
        let agg = aggregate(
            &[charge(1, 1_000, 0, 0, 5_000), charge(1, 2_000, 0, 0, 300)],
            Currency::USD,
        )
        .unwrap();
        assert_eq!(agg.discount.minor(), 1_000 + 300);
        assert_eq!(agg.total.minor(), 1_700);
        // components reconcile: subtotal + tax + shipping − discount == total
        assert_eq!(
            agg.subtotal.minor() + agg.tax.minor() + agg.shipping.minor() - agg.discount.minor(),
            agg.total.minor()
        );
    }

    #[test]
    fn test_aggregate_propagates_invalid_quantity() {
        let err = aggregate(&[charge(2, 100, 0, 0, 0), charge(0, 100, 0, 0, 0)], Currency::USD);
        assert!(matches!(err, Err(CoreError::InvalidQuantity { .. })));
    }

    #[test]
    fn test_aggregate_rejects_foreign_currency() {
        let err = aggregate(&[charge(1, 100, 0, 0, 0)], Currency::EUR);
        assert!(matches!(err, Err(CoreError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_compose_adds_order_level_charges() {
        let agg = aggregate(&[charge(2, 2_500, 250, 500, 0)], Currency::USD).unwrap();
        let order = OrderCharges {
            shipping_cost: usd(1_000),
            tax: usd(300),
            gift_wrap_cost: usd(150),
            discount: usd(500),
        };
        let totals = compose(&agg, &order).unwrap();
        // 57.50 + 10.00 + 3.00 + 1.50 − 5.00 = 67.00
        assert_eq!(totals.total.minor(), 6_700);
        assert_eq!(totals.subtotal.minor(), 5_000);
        assert_eq!(totals.tax.minor(), 550);
        assert_eq!(totals.shipping.minor(), 1_500);
        assert_eq!(totals.discount.minor(), 500);
        assert_eq!(totals.gift_wrap.minor(), 150);
    }

    #[test]
    fn test_compose_clamps_oversized_discount() {
        // Example 2: one line of 57.50, order-level discount 100.00 -> 0.00
        let agg = aggregate(&[charge(2, 2_500, 250, 500, 0)], Currency::USD).unwrap();
        let mut order = OrderCharges::zero(Currency::USD);
        order.discount = usd(10_000);
        let totals = compose(&agg, &order).unwrap();
        assert!(totals.total.is_zero());
        // reported discount is what was actually deducted, not the nominal 100.00
        assert_eq!(totals.discount.minor(), 5_750);
        assert_eq!(
            totals.subtotal.minor() + totals.tax.minor() + totals.shipping.minor()
                + totals.gift_wrap.minor()
                - totals.discount.minor(),
            totals.total.minor()
        );
    }

    #[test]
    fn test_charge_from_json_clamps_negative_components() {
        // a stored charge with a corrupted negative tax must not shrink the line
        let json = r#"{
            "quantity": 1,
            "unitPrice": {"minor": 1000, "currency": "USD"},
            "tax": {"minor": -600, "currency": "USD"},
            "shipping": {"minor": 0, "currency": "USD"},
            "discount": {"minor": 0, "currency": "USD"}
        }"#;
        let charge: Charge = serde_json::from_str(json).unwrap();
        assert!(charge.tax.is_zero());
        assert_eq!(line_total(&charge).unwrap().minor(), 1_000);
    }

    #[test]
    fn test_compose_is_idempotent() {
        // recomputing from the same items yields byte-identical totals
        let charges = [charge(3, 1_999, 166, 499, 300), charge(1, 4_950, 0, 0, 0)];
        let order = OrderCharges {
            shipping_cost: usd(795),
            tax: usd(0),
            gift_wrap_cost: usd(250),
            discount: usd(1_000),
        };
        let first = compose(&aggregate(&charges, Currency::USD).unwrap(), &order).unwrap();
        let second = compose(&aggregate(&charges, Currency::USD).unwrap(), &order).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_compose_currency_mismatch() {
        let agg = ItemAggregate::zero(Currency::USD);
        let order = OrderCharges::zero(Currency::EUR);
        assert!(matches!(
            compose(&agg, &order),
            Err(CoreError::CurrencyMismatch { .. })
        ));
    }
}
