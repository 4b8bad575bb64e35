//! # Money Module
//!
//! Provides the `Money` and `Currency` types for handling monetary values
//! safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    $10.99 is stored as 1099 cents - exact, comparable, orderable       │
//! │    Rounding happens exactly once, after each rate application          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - A `Money` is never negative at rest: any computation that would go
//!   below zero clamps to zero instead. Clamping is a defined
//!   normalization, NOT an error.
//! - Two amounts only combine when they share a currency; combining across
//!   currencies fails with [`CoreError::CurrencyMismatch`].
//! - Rate application rounds half-up to minor units; addition and
//!   subtraction never need rounding because stored sums are already at
//!   minor-unit precision.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::CommissionRate;

// =============================================================================
// Currency
// =============================================================================

/// An ISO 4217 alpha-3 currency code (e.g. "USD", "EUR").
///
/// Stored as three validated ASCII uppercase letters so it stays `Copy` and
/// comparison is a byte compare. Serialized as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const USD: Currency = Currency(*b"USD");
    pub const EUR: Currency = Currency(*b"EUR");
    pub const GBP: Currency = Currency(*b"GBP");
    pub const PKR: Currency = Currency(*b"PKR");

    /// Parses a currency code.
    ///
    /// ## Rules
    /// - Exactly 3 characters
    /// - ASCII uppercase letters only (ISO 4217 alpha code)
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidFormat {
                field: "currency".to_string(),
                reason: "must be a 3-letter uppercase ISO 4217 code".to_string(),
            });
        }
        Ok(Currency([bytes[0], bytes[1], bytes[2]]))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII, so this never takes the fallback.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.as_str().to_string()
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A non-negative monetary amount in minor units (cents for USD) tagged
/// with its currency.
///
/// ## Design Decisions
/// - **i64 minor units**: exact arithmetic, no binary floating point
/// - **Currency tag**: cross-currency arithmetic is unrepresentable without
///   going through a checked operation
/// - **Clamp to zero**: negative results are normalized to zero, so no
///   negative total, refund or discount is representable at rest
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product price ──► CartItem.unit_price ──► line total ──► aggregate    │
/// │                                                                         │
/// │  aggregate ──► order-level adjustments ──► Order.total_amount          │
/// │                                                                         │
/// │  line total ──► commission split ──► seller earning / payout           │
/// │                                                                         │
/// │  EVERY monetary value in the engine flows through this type           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", from = "RawMoney")]
pub struct Money {
    /// Amount in minor units. Always >= 0.
    minor: i64,
    /// ISO 4217 currency code.
    #[ts(as = "String")]
    currency: Currency,
}

/// Deserialization shadow for [`Money`].
///
/// Routes deserialized amounts through [`Money::from_minor`] so the
/// clamp-to-zero invariant also holds for values revived from JSON or a
/// database row - no negative money at rest, regardless of entry point.
#[derive(Deserialize)]
struct RawMoney {
    minor: i64,
    currency: Currency,
}

impl From<RawMoney> for Money {
    fn from(raw: RawMoney) -> Self {
        Money::from_minor(raw.minor, raw.currency)
    }
}

impl Money {
    /// Creates a Money value from minor units (cents for USD).
    ///
    /// Negative input clamps to zero - the clamp-to-zero normalization
    /// applies at every construction site so no caller can smuggle a
    /// negative amount past the invariant.
    ///
    /// ## Example
    /// ```rust
    /// use vendora_core::money::{Currency, Money};
    ///
    /// let price = Money::from_minor(1099, Currency::USD); // $10.99
    /// assert_eq!(price.minor(), 1099);
    ///
    /// let clamped = Money::from_minor(-500, Currency::USD);
    /// assert!(clamped.is_zero());
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64, currency: Currency) -> Self {
        Money {
            minor: if minor < 0 { 0 } else { minor },
            currency,
        }
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use vendora_core::money::{Currency, Money};
    ///
    /// let price = Money::from_major_minor(10, 99, Currency::USD);
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64, currency: Currency) -> Self {
        Money::from_minor(major * 100 + minor, currency)
    }

    /// Returns zero in the given currency (the aggregation identity).
    #[inline]
    pub const fn zero(currency: Currency) -> Self {
        Money { minor: 0, currency }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the major unit portion (dollars for USD).
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.minor / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        self.minor % 100
    }

    /// Returns the currency.
    #[inline]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Fails with `CurrencyMismatch` unless `other` shares this currency.
    #[inline]
    pub fn ensure_same_currency(&self, other: &Money) -> CoreResult<()> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(CoreError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            })
        }
    }

    /// Adds two amounts of the same currency.
    ///
    /// Saturates at `i64::MAX` minor units rather than wrapping; real
    /// order totals sit many orders of magnitude below that ceiling.
    pub fn checked_add(self, other: Money) -> CoreResult<Money> {
        self.ensure_same_currency(&other)?;
        Ok(Money {
            minor: self.minor.saturating_add(other.minor),
            currency: self.currency,
        })
    }

    /// Subtracts `other` from this amount, clamping the result to zero.
    ///
    /// A subtrahend larger than the amount yields zero - it does not
    /// produce a negative value or carry over. This is the defined
    /// normalization, not an error.
    ///
    /// ## Example
    /// ```rust
    /// use vendora_core::money::{Currency, Money};
    ///
    /// let total = Money::from_minor(5_750, Currency::USD);
    /// let discount = Money::from_minor(10_000, Currency::USD);
    /// let final_total = total.saturating_sub(discount).unwrap();
    /// assert!(final_total.is_zero());
    /// ```
    pub fn saturating_sub(self, other: Money) -> CoreResult<Money> {
        self.ensure_same_currency(&other)?;
        Ok(Money {
            minor: (self.minor - other.minor).max(0),
            currency: self.currency,
        })
    }

    /// Multiplies by an item quantity.
    ///
    /// Callers validate the quantity (positive integer) before getting
    /// here; see the line-item aggregator. A negative factor still clamps
    /// to zero so the non-negativity invariant holds unconditionally.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money::from_minor(self.minor.saturating_mul(qty), self.currency)
    }

    /// Applies a percentage rate, rounding half-up to minor units.
    ///
    /// ## Implementation
    /// Integer math: `(minor * bps + 5000) / 10000`. The `+ 5000` term is
    /// the half-up rounding (5000/10000 = 0.5). Widens to i128 so large
    /// amounts cannot overflow mid-computation.
    ///
    /// ## Example
    /// ```rust
    /// use vendora_core::money::{Currency, Money};
    /// use vendora_core::types::CommissionRate;
    ///
    /// let line_total = Money::from_minor(10_000, Currency::USD); // $100.00
    /// let rate = CommissionRate::from_percent(15).unwrap();
    ///
    /// let commission = line_total.apply_rate(rate);
    /// assert_eq!(commission.minor(), 1_500); // $15.00
    /// ```
    pub fn apply_rate(&self, rate: CommissionRate) -> Money {
        let minor = (self.minor as i128 * rate.bps() as i128 + 5_000) / 10_000;
        Money {
            minor: minor as i64,
            currency: self.currency,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money as `CODE major.minor`.
///
/// ## Note
/// This is for debugging and error messages. Use frontend formatting for
/// actual UI display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{:02}",
            self.currency,
            self.major_part(),
            self.minor_part()
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
