//! Pool handler running the catalog and decision pipeline

use crate::analysis::context::AnalysisContext;
use crate::analysis::types::{AnalysisRequest, AssetDecision};
use crate::pool::TaskHandler;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Executes one asset analysis per task.
pub struct AnalysisHandler {
    context: Arc<AnalysisContext>,
}

impl AnalysisHandler {
    pub fn new(context: Arc<AnalysisContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl TaskHandler for AnalysisHandler {
    type Job = AnalysisRequest;
    type Output = AssetDecision;

    async fn run(&self, job: Self::Job) -> Result<Self::Output, String> {
        let decision = self.context.engine().evaluate(&job.snapshot);
        debug!(
            asset = %job.asset,
            direction = ?decision.direction,
            confidence = decision.confidence,
            "AnalysisHandler: {} evaluated as {:?}",
            job.asset,
            decision.direction
        );
        Ok(AssetDecision {
            asset: job.asset,
            decision,
        })
    }
}
