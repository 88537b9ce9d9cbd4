//! Kelly criterion calculations
//!
//! The Kelly fraction maximizes long-run logarithmic capital growth given an
//! edge and a payoff ratio. The raw formula is aggressive, so the sizer caps
//! it hard and recommends a fractional variant keyed on how much history
//! backs the estimate.

use crate::config::SizingConfig;
use crate::models::PerformanceMetrics;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum closed trades before the formula is trusted at all.
const MIN_SAMPLE: u32 = 5;
/// Trades needed for full sample confidence.
const FULL_SAMPLE: f64 = 30.0;

/// Derived sizing output, recomputed on demand and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyCalculation {
    /// Raw Kelly fraction after the hard cap.
    pub kelly_fraction: f64,
    pub half_kelly: f64,
    pub quarter_kelly: f64,
    /// Fraction the sizer actually recommends deploying.
    pub recommended_fraction: f64,
    /// Blended confidence in the estimate, in [0, 1].
    pub confidence: f64,
    /// Number of trades the estimate is based on.
    pub sample_size: u32,
}

/// Single-asset Kelly sizer.
#[derive(Debug, Clone)]
pub struct KellySizer {
    config: SizingConfig,
}

impl KellySizer {
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    /// Compute the capped Kelly fraction and a recommendation from rolling
    /// performance statistics.
    ///
    /// Degenerate histories (too few trades, zero average loss, or a win
    /// rate without both outcomes) produce the conservative default instead
    /// of an error: sizing must always return a deployable answer.
    pub fn calculate(&self, metrics: &PerformanceMetrics) -> KellyCalculation {
        if metrics.total_trades < MIN_SAMPLE
            || metrics.avg_loss == 0.0
            || metrics.win_rate <= 0.0
            || metrics.win_rate >= 1.0
        {
            debug!(
                trades = metrics.total_trades,
                win_rate = metrics.win_rate,
                "KellySizer: degenerate performance history, using conservative default"
            );
            return self.conservative_default();
        }

        let p = metrics.win_rate;
        let q = 1.0 - p;
        let b = metrics.avg_win / metrics.avg_loss;

        let kelly = ((p * b - q) / b).clamp(0.0, self.config.kelly_cap);
        let half_kelly = kelly * 0.5;
        let quarter_kelly = kelly * 0.25;

        let confidence = self.confidence(metrics);

        let recommended = if confidence >= 0.9 && metrics.total_trades >= 100 {
            half_kelly
        } else if confidence >= 0.7 && metrics.total_trades >= 50 {
            quarter_kelly * 1.5
        } else {
            quarter_kelly
        };

        KellyCalculation {
            kelly_fraction: kelly,
            half_kelly,
            quarter_kelly,
            recommended_fraction: recommended.min(self.config.kelly_cap),
            confidence,
            sample_size: metrics.total_trades,
        }
    }

    /// Blend of sample depth and performance quality.
    fn confidence(&self, metrics: &PerformanceMetrics) -> f64 {
        let sample_confidence = (metrics.total_trades as f64 / FULL_SAMPLE).min(1.0);
        let performance_confidence = performance_tier(metrics);
        0.4 * sample_confidence + 0.6 * performance_confidence
    }

    fn conservative_default(&self) -> KellyCalculation {
        KellyCalculation {
            kelly_fraction: 0.0,
            half_kelly: 0.0,
            quarter_kelly: 0.0,
            recommended_fraction: self.config.min_fraction,
            confidence: 0.0,
            sample_size: 0,
        }
    }
}

/// Four-tier quality score on (win rate, profit factor, Sharpe ratio).
fn performance_tier(metrics: &PerformanceMetrics) -> f64 {
    if metrics.win_rate >= 0.6 && metrics.profit_factor >= 2.0 && metrics.sharpe_ratio >= 1.5 {
        0.9
    } else if metrics.win_rate >= 0.55 && metrics.profit_factor >= 1.5 && metrics.sharpe_ratio >= 1.0
    {
        0.7
    } else if metrics.win_rate >= 0.5 && metrics.profit_factor >= 1.2 && metrics.sharpe_ratio >= 0.5
    {
        0.5
    } else {
        0.3
    }
}

/// Expected logarithmic growth rate of capital at fraction `f`.
///
/// `g = p * ln(1 + b*f) + q * ln(1 - f)`. Exposed for analysis; not used as
/// gating logic.
pub fn expected_log_growth(win_probability: f64, payoff_ratio: f64, fraction: f64) -> f64 {
    let p = win_probability;
    let q = 1.0 - p;
    p * (1.0 + payoff_ratio * fraction).ln() + q * (1.0 - fraction).ln()
}

/// Probability of drawing down to `min_capital_ratio` of starting capital
/// when betting fraction `f` with win probability `p`.
///
/// `(q/p)^((1-a)/f)`, with the edge cases handled explicitly: a sure winner
/// never ruins, a sure loser always does, and an even game returns the
/// capital ratio itself.
pub fn risk_of_ruin(win_probability: f64, fraction: f64, min_capital_ratio: f64) -> f64 {
    let p = win_probability;
    if p >= 1.0 {
        return 0.0;
    }
    if p <= 0.0 {
        return 1.0;
    }
    let q = 1.0 - p;
    let a = min_capital_ratio;
    if (p - q).abs() < f64::EPSILON {
        return a;
    }
    if fraction <= 0.0 {
        return if q > p { 1.0 } else { 0.0 };
    }
    ((q / p).powf((1.0 - a) / fraction)).min(1.0)
}
