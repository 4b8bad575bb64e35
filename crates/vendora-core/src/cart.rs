//! # Cart Module
//!
//! The shopping cart: an ordered list of items tied to a user (or guest
//! identity), with its subtotal recomputed from the items on every read.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Operations                                    │
//! │                                                                         │
//! │  Storefront Action        Handler call            Cart change           │
//! │  ─────────────────        ────────────            ───────────           │
//! │                                                                         │
//! │  Click "Add to cart" ───► add_item() ───────────► push / merge qty     │
//! │                                                                         │
//! │  Change quantity ───────► update_quantity() ────► items[i].qty = n     │
//! │                           (0 removes the item)                          │
//! │                                                                         │
//! │  Click remove ──────────► remove_item() ────────► items.remove(i)      │
//! │                                                                         │
//! │  Click clear ───────────► clear() ──────────────► items.clear()        │
//! │                                                                         │
//! │  Checkout ──────────────► Order::from_cart() ───► cart consumed        │
//! │                                                                         │
//! │  The cart has no status lifecycle - it is destroyed on checkout or     │
//! │  explicit clear. Totals are never cached: every read recomputes.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Currency, Money};
use crate::totals::{aggregate, line_total, Charge, ItemAggregate};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Item
// =============================================================================

/// An item in the shopping cart.
///
/// ## Price Freezing
/// Sku, name and unit price are captured when the item is added. If the
/// product changes in the catalog afterwards, the cart keeps displaying
/// (and charging) what the buyer saw.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product reference.
    pub product_id: String,

    /// Optional variant reference (size, color, ...).
    pub variant_id: Option<String>,

    /// SKU at time of adding (frozen).
    pub sku: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price per unit at time of adding (frozen).
    pub unit_price: Money,

    /// Tax charged on this line.
    pub tax_amount: Money,

    /// Shipping charged on this line.
    pub shipping_amount: Money,

    /// Discount applied to this line.
    pub discount_amount: Money,

    /// Quantity in cart.
    pub quantity: i64,

    /// When this item was added to cart.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a cart item with no tax, shipping or discount.
    ///
    /// ## Errors
    /// - `InvalidQuantity` for `quantity <= 0`
    /// - `QuantityTooLarge` above [`MAX_ITEM_QUANTITY`]
    /// - `Validation(Required)` for an empty product id
    pub fn new(
        product_id: impl Into<String>,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> CoreResult<Self> {
        let product_id = product_id.into();
        if product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product_id".to_string(),
            }
            .into());
        }
        validate_quantity(quantity)?;

        let zero = Money::zero(unit_price.currency());
        Ok(CartItem {
            product_id,
            variant_id: None,
            sku: sku.into(),
            name: name.into(),
            unit_price,
            tax_amount: zero,
            shipping_amount: zero,
            discount_amount: zero,
            quantity,
            added_at: Utc::now(),
        })
    }

    /// Sets the variant reference.
    pub fn with_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    /// Sets the per-line tax. Fails on a currency mismatch.
    pub fn with_tax(mut self, tax: Money) -> CoreResult<Self> {
        self.unit_price.ensure_same_currency(&tax)?;
        self.tax_amount = tax;
        Ok(self)
    }

    /// Sets the per-line shipping. Fails on a currency mismatch.
    pub fn with_shipping(mut self, shipping: Money) -> CoreResult<Self> {
        self.unit_price.ensure_same_currency(&shipping)?;
        self.shipping_amount = shipping;
        Ok(self)
    }

    /// Sets the per-line discount. Fails on a currency mismatch.
    pub fn with_discount(mut self, discount: Money) -> CoreResult<Self> {
        self.unit_price.ensure_same_currency(&discount)?;
        self.discount_amount = discount;
        Ok(self)
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

    fn matches(&self, product_id: &str, variant_id: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_id.as_deref() == variant_id
    }
}

fn validate_quantity(quantity: i64) -> CoreResult<()> {
    if quantity <= 0 {
        return Err(CoreError::InvalidQuantity { quantity });
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `(product_id, variant_id)` - adding the same
///   product again increases its quantity
/// - Quantity is always 1..=[`MAX_ITEM_QUANTITY`]; updating to 0 removes
///   the item
/// - Every item shares [`Cart::currency`]
/// - At most [`MAX_CART_ITEMS`] unique items
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Owning user, or a guest identity token.
    pub user_id: String,

    /// Currency every item in this cart is denominated in.
    #[ts(as = "String")]
    pub currency: Currency,

    /// Items in the cart.
    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the cart last changed.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new(user_id: impl Into<String>, currency: Currency) -> Self {
        let now = Utc::now();
        Cart {
            user_id: user_id.into(),
            currency,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds an item, or increases quantity if the same product/variant is
    /// already present.
    pub fn add_item(&mut self, item: CartItem) -> CoreResult<()> {
        if item.unit_price.currency() != self.currency {
            return Err(CoreError::CurrencyMismatch {
                left: self.currency,
                right: item.unit_price.currency(),
            });
        }
        validate_quantity(item.quantity)?;

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.matches(&item.product_id, item.variant_id.as_deref()))
        {
            validate_quantity(existing.quantity + item.quantity)?;
            existing.quantity += item.quantity;
            self.updated_at = Utc::now();
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(item);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Updates the quantity of an item. A quantity of 0 removes it.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id, variant_id);
        }
        validate_quantity(quantity)?;

        match self
            .items
            .iter_mut()
            .find(|i| i.matches(product_id, variant_id))
        {
            Some(item) => {
                item.quantity = quantity;
                self.updated_at = Utc::now();
                Ok(())
            }
            None => Err(CoreError::ItemNotFound {
                id: product_id.to_string(),
            }),
        }
    }

    /// Removes an item from the cart.
    pub fn remove_item(&mut self, product_id: &str, variant_id: Option<&str>) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| !i.matches(product_id, variant_id));

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotFound {
                id: product_id.to_string(),
            })
        } else {
            self.updated_at = Utc::now();
            Ok(())
        }
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        let now = Utc::now();
        self.created_at = now;
        self.updated_at = now;
    }

    /// Returns the number of unique items in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checks if the cart is empty. An empty cart is valid; it only
    /// becomes an error at checkout.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Projects all items into aggregator input records.
    pub fn charges(&self) -> Vec<Charge> {
        self.items.iter().map(CartItem::charge).collect()
    }

    /// The cart subtotal (Σ unit_price × quantity), recomputed from the
    /// items - never cached.
    pub fn subtotal(&self) -> CoreResult<Money> {
        Ok(self.totals()?.subtotal)
    }

    /// Full aggregation of the cart lines (an empty cart folds to the
    /// all-zeros identity).
    pub fn totals(&self) -> CoreResult<ItemAggregate> {
        aggregate(&self.charges(), self.currency)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
