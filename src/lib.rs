//! quantrix: signal-weighted trade decisions, Kelly position sizing, and a
//! bounded worker pool for per-asset fan-out.
//!
//! The crate is a library embedded by an external orchestrator. Each
//! analysis cycle, the orchestrator hands one [`models::IndicatorSnapshot`]
//! per tracked asset to an [`analysis::Analyzer`], which fans the work out
//! over the [`pool::WorkerPool`] and returns one [`models::Decision`] per
//! asset. Realized performance history flows into [`sizing`] to produce the
//! capital fraction to deploy.

pub mod analysis;
pub mod config;
pub mod logging;
pub mod models;
pub mod pool;
pub mod signals;
pub mod sizing;
