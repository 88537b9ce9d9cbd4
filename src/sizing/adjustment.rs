//! Dynamic market-condition adjustment of a recommended fraction

use crate::models::{MarketConditions, TrendDirection};

/// Floor under the adjusted fraction.
const MIN_ADJUSTED_FRACTION: f64 = 0.01;

/// Dampen a recommended fraction for the current market state.
///
/// Each factor is independent and multiplicative: elevated volatility,
/// a non-bullish trend, and recent drawdown all shrink the position.
pub fn adjust_for_market(fraction: f64, conditions: &MarketConditions) -> f64 {
    let mut adjusted = fraction;

    if conditions.volatility > 0.7 {
        adjusted *= 0.5;
    } else if conditions.volatility > 0.5 {
        adjusted *= 0.7;
    }

    match conditions.trend {
        TrendDirection::Bearish => adjusted *= 0.6,
        TrendDirection::Sideways => adjusted *= 0.8,
        TrendDirection::Bullish => {}
    }

    if conditions.recent_drawdown > 0.15 {
        adjusted *= 0.5;
    } else if conditions.recent_drawdown > 0.1 {
        adjusted *= 0.7;
    }

    adjusted.max(MIN_ADJUSTED_FRACTION)
}
