//! Adapter layer: converts between the simulation's f64 world and the
//! Decimal values that make up a mechanism configuration.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Convert f64 to Decimal (lossy but sufficient for simulation).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Round a score to `dp` decimal places for reporting (half away from zero).
pub fn round_score(v: f64, dp: u32) -> f64 {
    from_decimal(to_decimal(v).round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
}
