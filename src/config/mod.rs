//! Operational configuration
//!
//! All tunables arrive through the environment or are set programmatically
//! by the embedding process. The core never persists configuration.

use crate::pool::PoolConfig;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Score thresholds driving the decision rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalThresholds {
    /// Minimum normalized score a side must reach to act at all.
    pub min_score: f64,
    /// How much the winning side must dominate the losing side.
    pub dominance_ratio: f64,
    pub strong_signal: f64,
    pub very_strong_signal: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            min_score: 15.0,
            dominance_ratio: 1.3,
            strong_signal: 35.0,
            very_strong_signal: 50.0,
        }
    }
}

/// Configuration for the signal engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub thresholds: SignalThresholds,
    /// Multiplier applied to sentiment-linked condition weights.
    pub news_impact: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: SignalThresholds::default(),
            news_impact: 1.0,
        }
    }
}

/// Configuration for Kelly sizing and portfolio allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Hard cap on the raw Kelly fraction.
    pub kelly_cap: f64,
    /// Cap on the summed portfolio allocation.
    pub portfolio_cap: f64,
    /// Correlation above which an asset's allocation is dampened.
    pub correlation_threshold: f64,
    /// Multiplier applied to highly correlated assets.
    pub correlation_penalty: f64,
    /// Floor under every recommended fraction.
    pub min_fraction: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            kelly_cap: 0.25,
            portfolio_cap: 0.8,
            correlation_threshold: 0.7,
            correlation_penalty: 0.7,
            min_fraction: 0.01,
        }
    }
}

/// Top-level configuration bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub sizing: SizingConfig,
    pub pool: PoolConfig,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables: `QUANTRIX_NEWS_IMPACT`, `QUANTRIX_WORKERS`,
    /// `QUANTRIX_TASK_TIMEOUT_SECS`. Unparseable values are logged and
    /// replaced by the default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Config::default();

        if let Some(news_impact) = parse_var::<f64>("QUANTRIX_NEWS_IMPACT") {
            config.engine.news_impact = news_impact;
        }
        if let Some(workers) = parse_var::<usize>("QUANTRIX_WORKERS") {
            config.pool.workers = workers;
        }
        if let Some(secs) = parse_var::<u64>("QUANTRIX_TASK_TIMEOUT_SECS") {
            config.pool.task_timeout = std::time::Duration::from_secs(secs);
        }

        config
    }
}

/// Deployment environment, used to pick the log format.
pub fn get_environment() -> String {
    env::var("QUANTRIX_ENV").unwrap_or_else(|_| "development".to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "Config: unparseable value for {}, using default", name);
            None
        }
    }
}
