//! Cycle-level fan-out of asset analysis

use crate::analysis::context::AnalysisContext;
use crate::analysis::handlers::AnalysisHandler;
use crate::analysis::types::{AnalysisRequest, AssetDecision};
use crate::config::EngineConfig;
use crate::pool::{EventSender, PoolConfig, PoolStatsSnapshot, WorkerPool};
use crate::signals::catalog::SignalCatalog;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the worker pool and runs one analysis task per tracked asset.
///
/// Constructed and shut down explicitly by the embedding process.
pub struct Analyzer {
    pool: WorkerPool<AnalysisHandler>,
}

impl Analyzer {
    pub fn new(catalog: Arc<SignalCatalog>, engine: EngineConfig, pool: PoolConfig) -> Self {
        let context = Arc::new(AnalysisContext::new(catalog, engine));
        let handler = Arc::new(AnalysisHandler::new(context));
        Self {
            pool: WorkerPool::new(handler, pool),
        }
    }

    /// Like [`Analyzer::new`], forwarding pool lifecycle events.
    pub fn with_events(
        catalog: Arc<SignalCatalog>,
        engine: EngineConfig,
        pool: PoolConfig,
        events: EventSender,
    ) -> Self {
        let context = Arc::new(AnalysisContext::new(catalog, engine));
        let handler = Arc::new(AnalysisHandler::new(context));
        Self {
            pool: WorkerPool::with_events(handler, pool, events),
        }
    }

    /// Analyze every tracked asset for this cycle.
    ///
    /// An asset whose task fails is logged and excluded from the cycle's
    /// results; the cycle itself never aborts.
    pub async fn analyze_cycle(&self, requests: Vec<AnalysisRequest>) -> Vec<AssetDecision> {
        let total = requests.len();
        let tasks: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let asset = request.asset.clone();
                async move { (asset, self.pool.submit(request).await) }
            })
            .collect();

        let mut decisions = Vec::with_capacity(total);
        for (asset, outcome) in join_all(tasks).await {
            match outcome {
                Ok(decision) => decisions.push(decision),
                Err(e) => {
                    warn!(
                        asset = %asset,
                        error = %e,
                        "Analyzer: excluding {} from this cycle: {}",
                        asset,
                        e
                    );
                }
            }
        }

        info!(
            analyzed = decisions.len(),
            total, "Analyzer: cycle complete, {}/{} assets analyzed", decisions.len(), total
        );
        decisions
    }

    pub fn pool_stats(&self) -> PoolStatsSnapshot {
        self.pool.stats()
    }

    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}
