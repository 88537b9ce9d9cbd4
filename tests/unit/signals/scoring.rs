//! Unit tests for side scoring and overfitting correction

use proptest::prelude::*;
use quantrix::models::IndicatorSnapshot;
use quantrix::signals::scoring::{overfit_factor, score_side};
use quantrix::signals::SignalCatalog;

fn everything_bullish() -> IndicatorSnapshot {
    IndicatorSnapshot::new(100.0)
        .with_rsi(15.0)
        .with_macd_histogram(1.0)
        .with_moving_averages(101.0, 99.0)
        .with_bands(130.0, 110.0)
        .with_volume_ratio(2.5)
        .with_order_book_imbalance(2.0)
        .with_trade_flow_ratio(1.5)
        .with_sentiment(0.5)
        .with_cross_market_premium(-1.5)
        .with_fear_greed(10.0)
}

#[test]
fn test_neutral_snapshot_scores_zero() {
    let catalog = SignalCatalog::spot_default();
    let snapshot = IndicatorSnapshot::new(100.0);

    let buy = score_side(&catalog.buy, &snapshot, 1.0);
    let sell = score_side(&catalog.sell, &snapshot, 1.0);
    assert_eq!(buy.raw, 0.0);
    assert_eq!(sell.raw, 0.0);
    assert_eq!(buy.corrected, 0.0);
    assert_eq!(sell.corrected, 0.0);
}

#[test]
fn test_fully_activated_side_is_cut_to_seventy_percent() {
    let catalog = SignalCatalog::spot_default();
    let buy = score_side(&catalog.buy, &everything_bullish(), 1.0);

    assert_eq!(buy.active_conditions, buy.total_conditions);
    assert!((buy.normalized - 100.0).abs() < 1e-9);
    assert!((buy.corrected - buy.normalized * 0.7).abs() < 1e-9);
}

#[test]
fn test_overfit_factor_tiers() {
    assert_eq!(overfit_factor(1.0), 0.7);
    assert_eq!(overfit_factor(0.81), 0.7);
    assert_eq!(overfit_factor(0.8), 0.9);
    assert_eq!(overfit_factor(0.61), 0.9);
    assert_eq!(overfit_factor(0.6), 1.0);
    assert_eq!(overfit_factor(0.0), 1.0);
}

#[test]
fn test_news_impact_changes_raw_but_not_range() {
    let catalog = SignalCatalog::spot_default();
    let snapshot = everything_bullish();

    let plain = score_side(&catalog.buy, &snapshot, 1.0);
    let boosted = score_side(&catalog.buy, &snapshot, 3.0);
    assert!(boosted.raw > plain.raw);
    // all conditions fire, so both normalize to the full scale
    assert!((boosted.normalized - 100.0).abs() < 1e-9);
}

proptest! {
    /// Normalized and corrected scores stay in [0, 100] for any inputs.
    #[test]
    fn prop_scores_bounded(
        price in 1.0f64..100_000.0,
        rsi in 0.0f64..100.0,
        macd in -50.0f64..50.0,
        ma_short in 1.0f64..100_000.0,
        ma_long in 1.0f64..100_000.0,
        band_upper in 1.0f64..200_000.0,
        band_lower in 0.5f64..100_000.0,
        volume_ratio in 0.0f64..10.0,
        imbalance in 0.0f64..10.0,
        flow in 0.0f64..10.0,
        sentiment in -1.0f64..1.0,
        premium in -20.0f64..20.0,
        fear_greed in 0.0f64..100.0,
        news_impact in 0.1f64..5.0,
    ) {
        let catalog = SignalCatalog::spot_default();
        let snapshot = IndicatorSnapshot::new(price)
            .with_rsi(rsi)
            .with_macd_histogram(macd)
            .with_moving_averages(ma_short, ma_long)
            .with_bands(band_upper, band_lower)
            .with_volume_ratio(volume_ratio)
            .with_order_book_imbalance(imbalance)
            .with_trade_flow_ratio(flow)
            .with_sentiment(sentiment)
            .with_cross_market_premium(premium)
            .with_fear_greed(fear_greed);

        for side in [&catalog.buy, &catalog.sell] {
            let score = score_side(side, &snapshot, news_impact);
            prop_assert!((0.0..=100.0).contains(&score.normalized));
            prop_assert!((0.0..=100.0).contains(&score.corrected));
            prop_assert!(score.corrected <= score.normalized + 1e-9);
        }
    }
}
