//! Main signal evaluation engine

use crate::config::EngineConfig;
use crate::models::{Decision, IndicatorSnapshot};
use crate::signals::catalog::SignalCatalog;
use crate::signals::decision::DecisionEngine;
use crate::signals::scoring::{score_side, SideScore};
use std::sync::Arc;

/// Facade tying catalog scoring and decision rules together.
///
/// Holds only read-only state and is freely shared across concurrent
/// analysis tasks.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    catalog: Arc<SignalCatalog>,
    config: EngineConfig,
    decision: DecisionEngine,
}

impl SignalEngine {
    pub fn new(catalog: Arc<SignalCatalog>, config: EngineConfig) -> Self {
        let decision = DecisionEngine::new(config.clone());
        Self {
            catalog,
            config,
            decision,
        }
    }

    /// Evaluate one snapshot into a decision.
    pub fn evaluate(&self, snapshot: &IndicatorSnapshot) -> Decision {
        let (buy, sell) = self.score(snapshot);
        self.decision.decide(&self.catalog, snapshot, &buy, &sell)
    }

    /// Score both sides without deciding, for diagnostics.
    pub fn score(&self, snapshot: &IndicatorSnapshot) -> (SideScore, SideScore) {
        let buy = score_side(&self.catalog.buy, snapshot, self.config.news_impact);
        let sell = score_side(&self.catalog.sell, snapshot, self.config.news_impact);
        (buy, sell)
    }

    pub fn catalog(&self) -> &SignalCatalog {
        &self.catalog
    }
}
