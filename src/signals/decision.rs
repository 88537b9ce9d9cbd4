//! Decision rules: direction selection, confidence, and special-situation
//! bonuses

use crate::config::EngineConfig;
use crate::models::{Decision, IndicatorSnapshot, SignalDirection, SignalStrength};
use crate::signals::catalog::{ConditionSet, SignalCatalog};
use crate::signals::scoring::SideScore;
use tracing::warn;

/// Conditions at or above this weight are reported as active signals.
const HIGH_WEIGHT: f64 = 2.0;
/// Confidence ceiling for non-hold decisions.
const MAX_CONFIDENCE: f64 = 95.0;
/// Fallback confidence when the computation yields a non-finite value.
const FALLBACK_ACTION_CONFIDENCE: f64 = 60.0;
const FALLBACK_HOLD_CONFIDENCE: f64 = 40.0;

/// Stateless rule engine turning side scores into a `Decision`.
///
/// Recomputed from fresh inputs every cycle; identical inputs produce an
/// identical decision.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: EngineConfig,
}

impl DecisionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Apply the decision rule to a pair of corrected side scores.
    pub fn decide(
        &self,
        catalog: &SignalCatalog,
        snapshot: &IndicatorSnapshot,
        buy: &SideScore,
        sell: &SideScore,
    ) -> Decision {
        let thresholds = &self.config.thresholds;
        let buy_score = buy.corrected;
        let sell_score = sell.corrected;

        let direction = if buy_score > thresholds.min_score
            && buy_score > sell_score * thresholds.dominance_ratio
        {
            SignalDirection::Buy
        } else if sell_score > thresholds.min_score
            && sell_score > buy_score * thresholds.dominance_ratio
        {
            SignalDirection::Sell
        } else {
            SignalDirection::Hold
        };

        let confidence = match direction {
            SignalDirection::Buy => self.action_confidence(buy_score, snapshot, direction),
            SignalDirection::Sell => self.action_confidence(sell_score, snapshot, direction),
            SignalDirection::Hold => hold_confidence(buy_score, sell_score),
        };
        let confidence = sanitize_confidence(confidence, direction);

        let active_signals = match direction {
            SignalDirection::Buy => active_signals(&catalog.buy, snapshot),
            SignalDirection::Sell => active_signals(&catalog.sell, snapshot),
            SignalDirection::Hold => Vec::new(),
        };

        Decision {
            direction,
            confidence,
            active_signals,
            buy_score,
            sell_score,
            timestamp: snapshot.timestamp,
        }
    }

    fn action_confidence(
        &self,
        winning_score: f64,
        snapshot: &IndicatorSnapshot,
        direction: SignalDirection,
    ) -> f64 {
        let thresholds = &self.config.thresholds;
        let base = SignalStrength::from_score(
            winning_score,
            thresholds.strong_signal,
            thresholds.very_strong_signal,
        )
        .base_confidence();
        let confidence = (base + winning_score * 0.3).min(MAX_CONFIDENCE);
        let bonus = situation_bonus(snapshot, direction);
        (confidence + bonus).min(MAX_CONFIDENCE)
    }
}

/// Confidence of a hold verdict, clamped to [20, 60].
fn hold_confidence(buy_score: f64, sell_score: f64) -> f64 {
    let max = buy_score.max(sell_score);
    let confidence = if max > 10.0 {
        35.0 + max * 0.3 + (buy_score - sell_score).abs() * 0.2
    } else {
        20.0 + max * 0.5
    };
    confidence.clamp(20.0, 60.0)
}

/// Replace a non-finite confidence with a direction-dependent default.
///
/// A trading decision must never be absent, so the anomaly is recovered
/// locally and logged rather than propagated.
fn sanitize_confidence(confidence: f64, direction: SignalDirection) -> f64 {
    if confidence.is_finite() {
        return confidence;
    }
    let fallback = match direction {
        SignalDirection::Buy | SignalDirection::Sell => FALLBACK_ACTION_CONFIDENCE,
        SignalDirection::Hold => FALLBACK_HOLD_CONFIDENCE,
    };
    warn!(
        direction = ?direction,
        fallback = fallback,
        "DecisionEngine: non-finite confidence, substituting {}",
        fallback
    );
    fallback
}

/// Flat confidence bonus for a fixed set of conjunctive special situations.
fn situation_bonus(snapshot: &IndicatorSnapshot, direction: SignalDirection) -> f64 {
    let mut bonus = 0.0;

    match direction {
        SignalDirection::Buy => {
            // Capitulation setup: panic sentiment with the asset trading at
            // a discount and deeply oversold.
            if snapshot.fear_greed < 20.0
                && snapshot.cross_market_premium < -1.0
                && snapshot.rsi < 20.0
            {
                bonus += 10.0;
            }
            if snapshot.volume_ratio > 2.0 && snapshot.order_book_imbalance > 1.5 {
                bonus += 5.0;
            }
        }
        SignalDirection::Sell => {
            // Euphoria setup: greed with an overheated premium and deeply
            // overbought oscillator.
            if snapshot.fear_greed > 80.0
                && snapshot.cross_market_premium > 3.0
                && snapshot.rsi > 80.0
            {
                bonus += 10.0;
            }
            if snapshot.volume_ratio > 2.0 && snapshot.order_book_imbalance < 0.67 {
                bonus += 5.0;
            }
        }
        SignalDirection::Hold => {}
    }

    bonus
}

/// Labels of the satisfied high-weight conditions on a side, in catalog
/// order.
fn active_signals(side: &ConditionSet, snapshot: &IndicatorSnapshot) -> Vec<String> {
    side.conditions()
        .iter()
        .filter(|c| c.weight >= HIGH_WEIGHT && c.is_met(snapshot))
        .map(|c| c.label.to_string())
        .collect()
}
