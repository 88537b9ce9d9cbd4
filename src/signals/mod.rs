//! Signal catalog, scoring, and decision rules

pub mod catalog;
pub mod decision;
pub mod engine;
pub mod scoring;

pub use catalog::{ConditionSet, SignalCatalog, WeightedCondition};
pub use decision::DecisionEngine;
pub use engine::SignalEngine;
pub use scoring::SideScore;
