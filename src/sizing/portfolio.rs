//! Portfolio-level allocation across independently sized assets

use crate::config::SizingConfig;
use crate::models::AssetPerformance;
use crate::sizing::kelly::KellySizer;
use std::collections::HashMap;
use tracing::debug;

/// Multi-asset allocator with a global exposure cap and correlation
/// dampening.
#[derive(Debug, Clone)]
pub struct PortfolioSizer {
    sizer: KellySizer,
    config: SizingConfig,
}

impl PortfolioSizer {
    pub fn new(config: SizingConfig) -> Self {
        Self {
            sizer: KellySizer::new(config.clone()),
            config,
        }
    }

    /// Allocate a capital fraction per asset.
    ///
    /// Per-asset Kelly fractions are computed independently. If their sum
    /// exceeds the global cap, every allocation is scaled down
    /// proportionally so the sum equals the cap exactly. Correlation
    /// dampening is applied after the proportional scale, not before.
    pub fn allocate(&self, assets: &[AssetPerformance]) -> HashMap<String, f64> {
        let mut allocations: Vec<(String, f64, f64)> = assets
            .iter()
            .map(|asset| {
                let calc = self.sizer.calculate(&asset.metrics);
                (
                    asset.asset_id.clone(),
                    calc.recommended_fraction,
                    asset.correlation,
                )
            })
            .collect();

        let total: f64 = allocations.iter().map(|(_, fraction, _)| fraction).sum();
        if total > self.config.portfolio_cap {
            let scale = self.config.portfolio_cap / total;
            debug!(
                total = total,
                cap = self.config.portfolio_cap,
                "PortfolioSizer: total allocation {:.3} exceeds cap, scaling by {:.3}",
                total,
                scale
            );
            for (_, fraction, _) in &mut allocations {
                *fraction *= scale;
            }
        }

        allocations
            .into_iter()
            .map(|(asset_id, fraction, correlation)| {
                let fraction = if correlation > self.config.correlation_threshold {
                    fraction * self.config.correlation_penalty
                } else {
                    fraction
                };
                (asset_id, fraction)
            })
            .collect()
    }
}
