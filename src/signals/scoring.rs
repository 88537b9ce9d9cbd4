//! Side score computation: weighted sums, normalization, and the
//! overfitting correction applied to over-activated sides

use crate::models::IndicatorSnapshot;
use crate::signals::catalog::ConditionSet;

/// Activation rate above which a side's score is cut to 70%.
const HEAVY_ACTIVATION: f64 = 0.8;
/// Activation rate above which a side's score is cut to 90%.
const ELEVATED_ACTIVATION: f64 = 0.6;

/// Scored state of one catalog side for one snapshot.
#[derive(Debug, Clone)]
pub struct SideScore {
    /// Weighted sum of satisfied conditions.
    pub raw: f64,
    /// Raw score scaled to [0, 100] against the side's static maximum.
    pub normalized: f64,
    /// Normalized score after overfitting correction.
    pub corrected: f64,
    pub active_conditions: usize,
    pub total_conditions: usize,
}

impl SideScore {
    pub fn activation_rate(&self) -> f64 {
        if self.total_conditions == 0 {
            0.0
        } else {
            self.active_conditions as f64 / self.total_conditions as f64
        }
    }
}

/// Evaluate every condition on a side and produce its score.
pub fn score_side(
    side: &ConditionSet,
    snapshot: &IndicatorSnapshot,
    news_impact: f64,
) -> SideScore {
    let max_score = side.max_score(news_impact);

    let mut raw = 0.0;
    let mut active = 0;
    for condition in side.conditions() {
        if condition.is_met(snapshot) {
            raw += condition.effective_weight(news_impact);
            active += 1;
        }
    }

    let normalized = if max_score > 0.0 {
        100.0 * raw / max_score
    } else {
        0.0
    };

    let mut score = SideScore {
        raw,
        normalized,
        corrected: normalized,
        active_conditions: active,
        total_conditions: side.len(),
    };
    score.corrected = normalized * overfit_factor(score.activation_rate());
    score
}

/// Correction factor for a side's activation rate.
///
/// A very high fraction of simultaneously true conditions on loosely
/// correlated indicators is treated as evidence of redundant signals rather
/// than stronger conviction, and the side's score is dampened.
pub fn overfit_factor(activation_rate: f64) -> f64 {
    if activation_rate > HEAVY_ACTIVATION {
        0.7
    } else if activation_rate > ELEVATED_ACTIVATION {
        0.9
    } else {
        1.0
    }
}
