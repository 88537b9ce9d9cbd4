//! Weighted condition catalogs per indicator family
//!
//! Conditions are plain named predicates built once from static
//! configuration. Catalogs are read-only after construction and shared
//! across concurrent analysis tasks without locking.

use crate::models::IndicatorSnapshot;
use std::fmt;

/// A named predicate over a snapshot plus a non-negative weight.
#[derive(Clone)]
pub struct WeightedCondition {
    /// Stable identifier, unique within a side.
    pub name: &'static str,
    /// Human-readable label reported in `Decision::active_signals`.
    pub label: &'static str,
    pub weight: f64,
    /// Sentiment-linked conditions are additionally scaled by the
    /// configured news impact multiplier.
    pub sentiment_linked: bool,
    predicate: fn(&IndicatorSnapshot) -> bool,
}

impl WeightedCondition {
    pub fn new(
        name: &'static str,
        label: &'static str,
        weight: f64,
        predicate: fn(&IndicatorSnapshot) -> bool,
    ) -> Self {
        Self {
            name,
            label,
            weight,
            sentiment_linked: false,
            predicate,
        }
    }

    pub fn sentiment_linked(mut self) -> Self {
        self.sentiment_linked = true;
        self
    }

    pub fn is_met(&self, snapshot: &IndicatorSnapshot) -> bool {
        (self.predicate)(snapshot)
    }

    /// Weight this condition contributes when satisfied.
    pub fn effective_weight(&self, news_impact: f64) -> f64 {
        if self.sentiment_linked {
            self.weight * news_impact
        } else {
            self.weight
        }
    }
}

impl fmt::Debug for WeightedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedCondition")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("sentiment_linked", &self.sentiment_linked)
            .finish()
    }
}

/// One side (buy or sell) of a catalog.
#[derive(Debug, Clone)]
pub struct ConditionSet {
    conditions: Vec<WeightedCondition>,
}

impl ConditionSet {
    pub fn new(conditions: Vec<WeightedCondition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[WeightedCondition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Static maximum score of this side, the sum of all effective weights.
    ///
    /// Raw scores can never exceed this, which keeps normalized scores in
    /// [0, 100] regardless of how many conditions the side carries.
    pub fn max_score(&self, news_impact: f64) -> f64 {
        self.conditions
            .iter()
            .map(|c| c.effective_weight(news_impact))
            .sum()
    }
}

/// Buy-side and sell-side condition sets for one asset class.
#[derive(Debug, Clone)]
pub struct SignalCatalog {
    pub buy: ConditionSet,
    pub sell: ConditionSet,
}

impl SignalCatalog {
    pub fn new(buy: ConditionSet, sell: ConditionSet) -> Self {
        Self { buy, sell }
    }

    /// Default catalog for spot crypto assets.
    pub fn spot_default() -> Self {
        let buy = ConditionSet::new(vec![
            WeightedCondition::new("rsi_oversold", "RSI oversold", 3.0, |s| s.rsi < 30.0),
            WeightedCondition::new("rsi_deep_oversold", "RSI deeply oversold", 2.0, |s| {
                s.rsi < 20.0
            }),
            WeightedCondition::new("ma_bullish", "Short MA above long MA", 2.5, |s| {
                s.ma_short > s.ma_long
            }),
            WeightedCondition::new("macd_bullish", "MACD histogram positive", 2.0, |s| {
                s.macd_histogram > 0.0
            }),
            WeightedCondition::new("below_lower_band", "Price below lower band", 2.0, |s| {
                s.price < s.band_lower
            }),
            WeightedCondition::new("volume_surge", "Volume surge", 2.0, |s| s.volume_ratio > 2.0),
            WeightedCondition::new("bid_heavy_book", "Order book bid-heavy", 2.5, |s| {
                s.order_book_imbalance > 1.5
            }),
            WeightedCondition::new("buy_flow", "Taker flow buy-heavy", 1.5, |s| {
                s.trade_flow_ratio > 1.2
            }),
            WeightedCondition::new("positive_sentiment", "News sentiment positive", 1.5, |s| {
                s.sentiment > 0.3
            })
            .sentiment_linked(),
            WeightedCondition::new("discount_premium", "Cross-market discount", 1.5, |s| {
                s.cross_market_premium < -0.5
            }),
            WeightedCondition::new("extreme_fear", "Extreme fear", 2.0, |s| s.fear_greed < 20.0),
        ]);

        let sell = ConditionSet::new(vec![
            WeightedCondition::new("rsi_overbought", "RSI overbought", 3.0, |s| s.rsi > 70.0),
            WeightedCondition::new("rsi_deep_overbought", "RSI deeply overbought", 2.0, |s| {
                s.rsi > 80.0
            }),
            WeightedCondition::new("ma_bearish", "Short MA below long MA", 2.5, |s| {
                s.ma_short < s.ma_long
            }),
            WeightedCondition::new("macd_bearish", "MACD histogram negative", 2.0, |s| {
                s.macd_histogram < 0.0
            }),
            WeightedCondition::new("above_upper_band", "Price above upper band", 2.0, |s| {
                s.price > s.band_upper
            }),
            WeightedCondition::new("volume_surge", "Volume surge", 2.0, |s| s.volume_ratio > 2.0),
            WeightedCondition::new("ask_heavy_book", "Order book ask-heavy", 2.5, |s| {
                s.order_book_imbalance < 0.67
            }),
            WeightedCondition::new("sell_flow", "Taker flow sell-heavy", 1.5, |s| {
                s.trade_flow_ratio < 0.83
            }),
            WeightedCondition::new("negative_sentiment", "News sentiment negative", 1.5, |s| {
                s.sentiment < -0.3
            })
            .sentiment_linked(),
            WeightedCondition::new("elevated_premium", "Cross-market premium elevated", 1.5, |s| {
                s.cross_market_premium > 3.0
            }),
            WeightedCondition::new("extreme_greed", "Extreme greed", 2.0, |s| s.fear_greed > 80.0),
        ]);

        Self::new(buy, sell)
    }
}
