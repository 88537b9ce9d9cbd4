use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-cycle, per-asset bundle of externally computed indicator values.
///
/// Produced by the analytics collaborator once per analysis cycle and read
/// only after construction. The engine never mutates a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub price: f64,
    /// Bounded momentum oscillator (0-100).
    pub rsi: f64,
    pub macd_histogram: f64,
    pub ma_short: f64,
    pub ma_long: f64,
    pub band_upper: f64,
    pub band_lower: f64,
    /// Current volume relative to its moving average.
    pub volume_ratio: f64,
    /// Resting bid volume divided by resting ask volume at the best prices.
    pub order_book_imbalance: f64,
    /// Taker buy volume divided by taker sell volume.
    pub trade_flow_ratio: f64,
    /// Aggregated news sentiment in [-1, 1].
    pub sentiment: f64,
    /// Price premium versus the reference market, in percent.
    pub cross_market_premium: f64,
    /// Market-wide fear/greed index (0 = extreme fear, 100 = extreme greed).
    pub fear_greed: f64,
    pub timestamp: DateTime<Utc>,
}

impl IndicatorSnapshot {
    /// Create a neutral snapshot at the given price.
    ///
    /// All readings start at values that satisfy no catalog condition, so
    /// tests and callers only set the fields they care about.
    pub fn new(price: f64) -> Self {
        Self {
            price,
            rsi: 50.0,
            macd_histogram: 0.0,
            ma_short: price,
            ma_long: price,
            band_upper: price * 1.02,
            band_lower: price * 0.98,
            volume_ratio: 1.0,
            order_book_imbalance: 1.0,
            trade_flow_ratio: 1.0,
            sentiment: 0.0,
            cross_market_premium: 0.0,
            fear_greed: 50.0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_rsi(mut self, rsi: f64) -> Self {
        self.rsi = rsi;
        self
    }

    pub fn with_macd_histogram(mut self, histogram: f64) -> Self {
        self.macd_histogram = histogram;
        self
    }

    pub fn with_moving_averages(mut self, short: f64, long: f64) -> Self {
        self.ma_short = short;
        self.ma_long = long;
        self
    }

    pub fn with_bands(mut self, upper: f64, lower: f64) -> Self {
        self.band_upper = upper;
        self.band_lower = lower;
        self
    }

    pub fn with_volume_ratio(mut self, ratio: f64) -> Self {
        self.volume_ratio = ratio;
        self
    }

    pub fn with_order_book_imbalance(mut self, imbalance: f64) -> Self {
        self.order_book_imbalance = imbalance;
        self
    }

    pub fn with_trade_flow_ratio(mut self, ratio: f64) -> Self {
        self.trade_flow_ratio = ratio;
        self
    }

    pub fn with_sentiment(mut self, sentiment: f64) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn with_cross_market_premium(mut self, premium: f64) -> Self {
        self.cross_market_premium = premium;
        self
    }

    pub fn with_fear_greed(mut self, index: f64) -> Self {
        self.fear_greed = index;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
