//! Decision model produced once per asset per cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directional verdict for one asset in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Buy,
    Sell,
    Hold,
}

/// Strength bucket of a normalized side score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    VeryWeak,
}

impl SignalStrength {
    /// Bucket a normalized score (0-100) against the configured strong and
    /// very-strong cutoffs. The moderate and weak cutoffs are fixed.
    pub fn from_score(score: f64, strong: f64, very_strong: f64) -> Self {
        if score >= very_strong {
            SignalStrength::VeryStrong
        } else if score >= strong {
            SignalStrength::Strong
        } else if score >= 20.0 {
            SignalStrength::Moderate
        } else if score >= 15.0 {
            SignalStrength::Weak
        } else {
            SignalStrength::VeryWeak
        }
    }

    /// Base confidence assigned to a non-hold decision in this bucket.
    pub fn base_confidence(self) -> f64 {
        match self {
            SignalStrength::VeryStrong => 70.0,
            SignalStrength::Strong => 60.0,
            SignalStrength::Moderate => 50.0,
            SignalStrength::Weak | SignalStrength::VeryWeak => 40.0,
        }
    }
}

/// Immutable output of one engine evaluation.
///
/// `active_signals` is advisory metadata for the orchestrator; it plays no
/// part in further computation. The timestamp is copied from the snapshot so
/// that identical inputs produce identical decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub direction: SignalDirection,
    /// Confidence in [0, 100].
    pub confidence: f64,
    /// Human-readable labels of the satisfied high-weight conditions on the
    /// winning side, in catalog order. Empty for hold decisions.
    pub active_signals: Vec<String>,
    /// Normalized buy-side score after overfitting correction.
    pub buy_score: f64,
    /// Normalized sell-side score after overfitting correction.
    pub sell_score: f64,
    pub timestamp: DateTime<Utc>,
}

impl Decision {
    pub fn is_actionable(&self) -> bool {
        self.direction != SignalDirection::Hold
    }
}
