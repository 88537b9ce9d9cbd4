//! Per-asset analysis pipeline fanned out over the worker pool

pub mod analyzer;
pub mod context;
pub mod handlers;
pub mod types;

pub use analyzer::Analyzer;
pub use context::AnalysisContext;
pub use handlers::AnalysisHandler;
pub use types::{AnalysisRequest, AssetDecision};
