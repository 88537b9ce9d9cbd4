//! Job types for the per-asset analysis pipeline

use crate::models::{Decision, IndicatorSnapshot};
use serde::{Deserialize, Serialize};

/// Request to analyze one asset's snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub asset: String,
    pub snapshot: IndicatorSnapshot,
}

/// Decision for one asset in one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDecision {
    pub asset: String,
    pub decision: Decision,
}
