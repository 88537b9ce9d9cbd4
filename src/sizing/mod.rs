//! Kelly-based position sizing

pub mod adjustment;
pub mod kelly;
pub mod portfolio;

pub use adjustment::adjust_for_market;
pub use kelly::{expected_log_growth, risk_of_ruin, KellyCalculation, KellySizer};
pub use portfolio::PortfolioSizer;
