//! Analysis context for dependency injection

use crate::config::EngineConfig;
use crate::signals::catalog::SignalCatalog;
use crate::signals::engine::SignalEngine;
use std::sync::Arc;

/// Read-only state shared by every analysis task.
///
/// The catalog and thresholds are loaded once and never mutated, so the
/// context crosses worker boundaries without locking.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    engine: SignalEngine,
}

impl AnalysisContext {
    pub fn new(catalog: Arc<SignalCatalog>, config: EngineConfig) -> Self {
        Self {
            engine: SignalEngine::new(catalog, config),
        }
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }
}
