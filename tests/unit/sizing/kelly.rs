//! Unit tests for the Kelly calculator

use quantrix::config::SizingConfig;
use quantrix::models::PerformanceMetrics;
use quantrix::sizing::{expected_log_growth, risk_of_ruin, KellySizer};

fn sizer() -> KellySizer {
    KellySizer::new(SizingConfig::default())
}

fn solid_metrics() -> PerformanceMetrics {
    PerformanceMetrics::new(0.6, 1.5, 1.0, 100)
        .with_profit_factor(2.0)
        .with_sharpe_ratio(1.5)
}

#[test]
fn test_raw_kelly_is_capped() {
    // (0.6 * 1.5 - 0.4) / 1.5 = 0.333.., above the 0.25 cap
    let calc = sizer().calculate(&solid_metrics());
    assert_eq!(calc.kelly_fraction, 0.25);
    assert_eq!(calc.half_kelly, 0.125);
    assert_eq!(calc.quarter_kelly, 0.0625);
}

#[test]
fn test_short_history_gets_conservative_default() {
    let metrics = PerformanceMetrics::new(0.9, 3.0, 1.0, 3);
    let calc = sizer().calculate(&metrics);
    assert_eq!(calc.recommended_fraction, 0.01);
    assert_eq!(calc.confidence, 0.0);
    assert_eq!(calc.sample_size, 0);
}

#[test]
fn test_zero_loss_history_gets_conservative_default() {
    let metrics = PerformanceMetrics::new(0.6, 1.5, 0.0, 100);
    let calc = sizer().calculate(&metrics);
    assert_eq!(calc.recommended_fraction, 0.01);
    assert_eq!(calc.confidence, 0.0);
}

#[test]
fn test_degenerate_win_rates_get_conservative_default() {
    for win_rate in [0.0, 1.0] {
        let metrics = PerformanceMetrics::new(win_rate, 1.5, 1.0, 100);
        let calc = sizer().calculate(&metrics);
        assert_eq!(calc.recommended_fraction, 0.01);
        assert_eq!(calc.sample_size, 0);
    }
}

#[test]
fn test_negative_edge_floors_at_zero() {
    // expectation is negative: kelly formula goes below zero and is clamped
    let metrics = PerformanceMetrics::new(0.3, 1.0, 1.0, 60)
        .with_profit_factor(0.8)
        .with_sharpe_ratio(-0.5);
    let calc = sizer().calculate(&metrics);
    assert_eq!(calc.kelly_fraction, 0.0);
    assert_eq!(calc.recommended_fraction, 0.0);
}

#[test]
fn test_high_confidence_long_history_recommends_half_kelly() {
    let calc = sizer().calculate(&solid_metrics());
    // sample confidence 1.0, performance tier 0.9 -> 0.94 blended
    assert!(calc.confidence >= 0.9);
    assert_eq!(calc.recommended_fraction, calc.half_kelly);
}

#[test]
fn test_middling_confidence_recommends_scaled_quarter() {
    let metrics = PerformanceMetrics::new(0.56, 1.4, 1.0, 60)
        .with_profit_factor(1.6)
        .with_sharpe_ratio(1.1);
    let calc = sizer().calculate(&metrics);
    assert!(calc.confidence >= 0.7);
    assert!(calc.confidence < 0.9);
    assert!((calc.recommended_fraction - calc.quarter_kelly * 1.5).abs() < 1e-12);
}

#[test]
fn test_low_confidence_recommends_quarter_kelly() {
    let metrics = PerformanceMetrics::new(0.52, 1.1, 1.0, 20)
        .with_profit_factor(1.25)
        .with_sharpe_ratio(0.6);
    let calc = sizer().calculate(&metrics);
    assert!(calc.confidence < 0.7);
    assert_eq!(calc.recommended_fraction, calc.quarter_kelly);
}

#[test]
fn test_expected_log_growth_is_positive_at_small_fractions_with_edge() {
    let growth = expected_log_growth(0.6, 1.5, 0.1);
    assert!(growth > 0.0);
    // overbetting destroys growth
    let ruinous = expected_log_growth(0.6, 1.5, 0.95);
    assert!(ruinous < 0.0);
}

#[test]
fn test_risk_of_ruin_edge_cases() {
    assert_eq!(risk_of_ruin(1.0, 0.1, 0.5), 0.0);
    assert_eq!(risk_of_ruin(0.0, 0.1, 0.5), 1.0);
    // even game returns the capital ratio directly
    assert_eq!(risk_of_ruin(0.5, 0.1, 0.5), 0.5);
}

#[test]
fn test_risk_of_ruin_falls_with_better_odds() {
    let worse = risk_of_ruin(0.55, 0.1, 0.5);
    let better = risk_of_ruin(0.65, 0.1, 0.5);
    assert!(better < worse);
    assert!((0.0..=1.0).contains(&worse));
    assert!((0.0..=1.0).contains(&better));
}
