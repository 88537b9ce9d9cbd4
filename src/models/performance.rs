//! Performance statistics supplied by the ledger collaborator

use serde::{Deserialize, Serialize};

/// Rolling trade statistics for one asset or strategy.
///
/// Owned by an external ledger; the sizer only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Fraction of closed trades that were profitable, in [0, 1].
    pub win_rate: f64,
    /// Average profit of winning trades, in return units.
    pub avg_win: f64,
    /// Average loss of losing trades, as a positive number.
    pub avg_loss: f64,
    pub total_trades: u32,
    /// Gross profit divided by gross loss.
    pub profit_factor: f64,
    pub sharpe_ratio: f64,
    /// Peak-to-trough decline over the rolling window, in [0, 1].
    pub max_drawdown: f64,
}

impl PerformanceMetrics {
    pub fn new(win_rate: f64, avg_win: f64, avg_loss: f64, total_trades: u32) -> Self {
        Self {
            win_rate,
            avg_win,
            avg_loss,
            total_trades,
            profit_factor: 1.0,
            sharpe_ratio: 0.0,
            max_drawdown: 0.0,
        }
    }

    pub fn with_profit_factor(mut self, profit_factor: f64) -> Self {
        self.profit_factor = profit_factor;
        self
    }

    pub fn with_sharpe_ratio(mut self, sharpe_ratio: f64) -> Self {
        self.sharpe_ratio = sharpe_ratio;
        self
    }

    pub fn with_max_drawdown(mut self, max_drawdown: f64) -> Self {
        self.max_drawdown = max_drawdown;
        self
    }
}

/// Broad market regime used to dampen position sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Bullish,
    Sideways,
    Bearish,
}

/// Current market state for dynamic size adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConditions {
    /// Normalized volatility estimate in [0, 1].
    pub volatility: f64,
    pub trend: TrendDirection,
    /// Portfolio drawdown over the recent window, in [0, 1].
    pub recent_drawdown: f64,
}

impl Default for MarketConditions {
    fn default() -> Self {
        Self {
            volatility: 0.3,
            trend: TrendDirection::Bullish,
            recent_drawdown: 0.0,
        }
    }
}

/// Per-asset input tuple for portfolio allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPerformance {
    pub asset_id: String,
    pub metrics: PerformanceMetrics,
    /// Average correlation of this asset to the rest of the portfolio.
    pub correlation: f64,
}
