//! # Shared Domain Types
//!
//! Rate and configuration types used across the engine.
//!
//! ## Why Basis Points?
//! 1 basis point = 0.01% = 1/10000. Storing rates as integer basis points
//! keeps every rate computation in exact integer math: 1500 bps = 15%,
//! 825 bps = 8.25%. No floating point touches a stored amount.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Currency, Money};
use crate::COMMISSION_RATE_MAX_BPS;

// =============================================================================
// Commission Rate
// =============================================================================

/// Platform commission rate in basis points, bounded to 0..=100%.
///
/// The bound is enforced in the constructors so every caller - API handler,
/// background job, admin tool - gets the same guarantee regardless of entry
/// point. A raw `u32` never reaches rate arithmetic: deserialization goes
/// through [`CommissionRate::from_bps`] too, so an out-of-range rate cannot
/// revive from JSON or a database row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(try_from = "u32", into = "u32")]
#[ts(export)]
pub struct CommissionRate(u32);

impl TryFrom<u32> for CommissionRate {
    type Error = CoreError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        CommissionRate::from_bps(bps)
    }
}

impl From<CommissionRate> for u32 {
    fn from(rate: CommissionRate) -> Self {
        rate.0
    }
}

impl CommissionRate {
    /// Creates a commission rate from basis points (1500 = 15%).
    ///
    /// Fails with [`CoreError::InvalidCommissionRate`] above 10000 bps.
    pub fn from_bps(bps: u32) -> CoreResult<Self> {
        if bps > COMMISSION_RATE_MAX_BPS {
            return Err(CoreError::InvalidCommissionRate { bps });
        }
        Ok(CommissionRate(bps))
    }

    /// Creates a commission rate from a whole percentage (15 = 15%).
    ///
    /// Fractional rates go through [`CommissionRate::from_bps`]
    /// (1250 bps = 12.5%).
    pub fn from_percent(pct: u32) -> CoreResult<Self> {
        Self::from_bps(pct.saturating_mul(100))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero commission rate.
    #[inline]
    pub const fn zero() -> Self {
        CommissionRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::zero()
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Per-call engine configuration.
///
/// ## Design
/// The engine never reads ambient/global state. Platform defaults (the
/// commission applied to new order items, the gift wrap charge) travel in
/// this value struct, supplied by the caller at checkout time. That keeps
/// every computation pure and testable in isolation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Commission rate seeded onto items at cart -> order conversion.
    /// Per-vendor overrides are applied by the caller afterwards.
    pub default_commission_rate: CommissionRate,

    /// Flat gift wrap charge applied when the buyer requests wrapping.
    pub gift_wrap_cost: Money,
}

impl EngineConfig {
    /// Config with zero commission and zero gift wrap in the given currency.
    pub fn for_currency(currency: Currency) -> Self {
        EngineConfig {
            default_commission_rate: CommissionRate::zero(),
            gift_wrap_cost: Money::zero(currency),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_rate_bounds() {
        assert_eq!(CommissionRate::from_bps(0).unwrap().bps(), 0);
        assert_eq!(CommissionRate::from_bps(10_000).unwrap().bps(), 10_000);
        assert!(matches!(
            CommissionRate::from_bps(10_001),
            Err(CoreError::InvalidCommissionRate { bps: 10_001 })
        ));
    }

    #[test]
    fn test_commission_rate_from_percent() {
        let rate = CommissionRate::from_percent(15).unwrap();
        assert_eq!(rate.bps(), 1_500);
        assert!((rate.percent() - 15.0).abs() < 0.001);
        assert!(CommissionRate::from_percent(101).is_err());
    }

    #[test]
    fn test_commission_rate_deserialize_enforces_bound() {
        // the wire format is plain basis points
        let rate: CommissionRate = serde_json::from_str("1500").unwrap();
        assert_eq!(rate.bps(), 1_500);
        assert_eq!(serde_json::to_string(&rate).unwrap(), "1500");

        // an out-of-range rate must not revive from JSON
        assert!(serde_json::from_str::<CommissionRate>("10001").is_err());
        assert!(serde_json::from_str::<CommissionRate>("20000").is_err());
    }

    #[test]
    fn test_commission_rate_display() {
        let rate = CommissionRate::from_bps(1_250).unwrap();
        assert_eq!(rate.to_string(), "12.5%");
    }

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::for_currency(Currency::USD);
        assert!(config.default_commission_rate.is_zero());
        assert!(config.gift_wrap_cost.is_zero());
    }
}
