//! # Commission Module
//!
//! Splits each sold line between the platform and the seller, and prorates
//! the split when a line is refunded.
//!
//! ## Split Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Commission / Payout Split                           │
//! │                                                                         │
//! │  commission      = round2(line_total × rate)        (half-up)          │
//! │  seller_earning  = line_total − commission                              │
//! │                                                                         │
//! │  Conservation: seller_earning + commission == line_total               │
//! │                                                                         │
//! │  On refund (refund ≤ line_total):                                      │
//! │  commission_refund = round2(refund × rate)                             │
//! │  seller_earning    = clamp0((line_total − refund)                      │
//! │                             − (commission − commission_refund))        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module is the single source of truth for seller earnings - no
//! caller computes a payout outside of it, pre- or post-refund.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::CommissionRate;

// =============================================================================
// Split Records
// =============================================================================

/// The platform/seller split of one line total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSplit {
    /// Platform's cut.
    pub commission: Money,
    /// Amount remitted to the seller.
    pub seller_earning: Money,
}

/// The recomputed split after a refund against a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RefundSplit {
    /// Commission returned to the buyer's side of the ledger,
    /// proportional to the refunded amount.
    pub commission_refund: Money,
    /// Commission the platform keeps after the refund.
    pub commission_retained: Money,
    /// Seller earning recomputed against the post-refund line total.
    pub seller_earning: Money,
}

// =============================================================================
// Splitter
// =============================================================================

/// Splits a line total between platform commission and seller earning.
///
/// ## Example
/// ```rust
/// use vendora_core::commission::split;
/// use vendora_core::money::{Currency, Money};
/// use vendora_core::types::CommissionRate;
///
/// let line_total = Money::from_minor(10_000, Currency::USD); // $100.00
/// let rate = CommissionRate::from_percent(15).unwrap();
///
/// let s = split(line_total, rate).unwrap();
/// assert_eq!(s.commission.minor(), 1_500);     // $15.00
/// assert_eq!(s.seller_earning.minor(), 8_500); // $85.00
/// ```
pub fn split(line_total: Money, rate: CommissionRate) -> CoreResult<CommissionSplit> {
    let commission = line_total.apply_rate(rate);
    let seller_earning = line_total.saturating_sub(commission)?;
    Ok(CommissionSplit {
        commission,
        seller_earning,
    })
}

/// Recomputes the split after a refund against the line.
///
/// The commission is refunded proportionally, and the seller earning is
/// recomputed against `line_total − refund` rather than the original
/// line total.
///
/// ## Errors
/// - [`CoreError::RefundExceedsLineTotal`] when `refund > line_total`
/// - [`CoreError::CurrencyMismatch`] when refund and line total differ
///   in currency
pub fn split_after_refund(
    line_total: Money,
    refund: Money,
    rate: CommissionRate,
) -> CoreResult<RefundSplit> {
    line_total.ensure_same_currency(&refund)?;
    if refund.minor() > line_total.minor() {
        return Err(CoreError::RefundExceedsLineTotal { refund, line_total });
    }

    let commission = line_total.apply_rate(rate);
    let commission_refund = refund.apply_rate(rate);
    let commission_retained = commission.saturating_sub(commission_refund)?;
    let net_line = line_total.saturating_sub(refund)?;
    let seller_earning = net_line.saturating_sub(commission_retained)?;

    Ok(RefundSplit {
        commission_refund,
        commission_retained,
        seller_earning,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
