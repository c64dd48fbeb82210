//! Combination rule tests

use super::*;
use crate::config::BlendConfig;
use crate::error::ForecastError;
use crate::estimation::{
    BlendingEstimator, Estimator, PatternSignalProvider, ReportFeed, SignalBehavior, WithReports,
    combine,
};
use crate::models::{Estimate, Estimation};

fn expect_estimate(estimation: Estimation) -> Estimate {
    match estimation {
        Estimation::Estimate(estimate) => estimate,
        Estimation::InsufficientData => panic!("Expected an estimate"),
    }
}

#[test]
fn test_no_signal_is_insufficient() {
    let blend = BlendConfig::default();
    assert_eq!(combine(&blend, &[], None), Estimation::InsufficientData);
}

#[test]
fn test_reports_without_values_are_ignored() {
    let blend = BlendConfig::default();
    let empty = LiveReport {
        location: "loc:a".to_string(),
        reported_wait_minutes: None,
        reported_crowd_level: None,
    };
    assert_eq!(combine(&blend, &[empty], None), Estimation::InsufficientData);
}

#[test]
fn test_baseline_only_uses_baseline_mean() {
    let blend = BlendConfig::default();
    let estimate = expect_estimate(combine(&blend, &[], Some(baseline(20.0, 4.0))));

    assert_eq!(estimate.estimated_wait_minutes, 20.0);
    // max(5, 0.25 * 20) + full baseline spread
    assert_eq!(estimate.confidence_interval.low, 11.0);
    assert_eq!(estimate.confidence_interval.high, 29.0);
    assert!((estimate.entry_probability - 0.8).abs() < 1e-9);
}

#[test]
fn test_live_only_uses_live_mean() {
    let blend = BlendConfig::default();
    let reports = [wait_report("loc:a", 10.0), wait_report("loc:a", 30.0)];
    let estimate = expect_estimate(combine(&blend, &reports, None));

    assert_eq!(estimate.estimated_wait_minutes, 20.0);
    assert_eq!(estimate.confidence_interval.low, 15.0);
    assert_eq!(estimate.confidence_interval.high, 25.0);
}

#[test]
fn test_live_weight_grows_per_report_and_caps() {
    let blend = BlendConfig::default();
    let base = Some(baseline(10.0, 0.0));

    let one = expect_estimate(combine(&blend, &[wait_report("l", 60.0)], base));
    // 0.2 * 60 + 0.8 * 10
    assert!((one.estimated_wait_minutes - 20.0).abs() < 1e-9);

    let many: Vec<_> = (0..10).map(|_| wait_report("l", 60.0)).collect();
    let capped = expect_estimate(combine(&blend, &many, base));
    // capped at 0.8 * 60 + 0.2 * 10
    assert!((capped.estimated_wait_minutes - 50.0).abs() < 1e-9);
}

#[test]
fn test_crowd_level_maps_to_minutes() {
    let blend = BlendConfig::default();
    let estimate = expect_estimate(combine(
        &blend,
        &[crowd_report("l", CrowdLevel::High)],
        None,
    ));
    assert_eq!(
        estimate.estimated_wait_minutes,
        blend.crowd_level_wait(CrowdLevel::High)
    );
}

#[test]
fn test_explicit_wait_beats_crowd_level() {
    let blend = BlendConfig::default();
    let report = LiveReport {
        location: "l".to_string(),
        reported_wait_minutes: Some(7.0),
        reported_crowd_level: Some(CrowdLevel::Packed),
    };
    let estimate = expect_estimate(combine(&blend, &[report], None));
    assert_eq!(estimate.estimated_wait_minutes, 7.0);
}

#[test]
fn test_zero_wait_is_an_estimate_not_missing_data() {
    let blend = BlendConfig::default();
    let estimate = expect_estimate(combine(&blend, &[wait_report("l", 0.0)], None));
    assert_eq!(estimate.estimated_wait_minutes, 0.0);
    assert_eq!(estimate.entry_probability, 1.0);
    assert_eq!(estimate.confidence_interval.low, 0.0);
}

#[test]
fn test_negative_reports_clamp_to_zero() {
    let blend = BlendConfig::default();
    let estimate = expect_estimate(combine(&blend, &[wait_report("l", -15.0)], None));
    assert_eq!(estimate.estimated_wait_minutes, 0.0);
}

#[test]
fn test_probability_bounded_and_non_increasing_in_wait() {
    let blend = BlendConfig::default();
    let mut previous = 1.0;
    for minutes in [0.0, 10.0, 50.0, 99.0, 150.0, 10_000.0] {
        let estimate = expect_estimate(combine(&blend, &[wait_report("l", minutes)], None));
        assert!((0.0..=1.0).contains(&estimate.entry_probability));
        assert!(estimate.entry_probability <= previous);
        assert!(estimate.confidence_interval.contains(estimate.estimated_wait_minutes));
        previous = estimate.entry_probability;
    }
    assert_eq!(previous, 0.0);
}

#[test]
fn test_non_finite_baseline_is_ignored() {
    let blend = BlendConfig::default();
    assert_eq!(
        combine(&blend, &[], Some(baseline(f64::NAN, 1.0))),
        Estimation::InsufficientData
    );
}

#[tokio::test]
async fn test_estimator_no_data_rule() {
    let estimator = BlendingEstimator::new(PatternSignalProvider::new(), BlendConfig::default());
    assert_eq!(
        estimator.estimate("loc:no-data").await.unwrap(),
        Estimation::InsufficientData
    );
}

#[tokio::test]
async fn test_estimator_provider_fault_is_estimation_failure() {
    let estimator = BlendingEstimator::new(PatternSignalProvider::new(), BlendConfig::default());
    match estimator.estimate("loc:fail").await {
        Err(ForecastError::EstimationFailed { location, reason }) => {
            assert_eq!(location, "loc:fail");
            assert!(reason.contains("unavailable"));
        }
        other => panic!("Expected EstimationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_estimator_live_reports_rescue_missing_baseline() {
    let mut feed = ReportFeed::new();
    feed.push(wait_report("loc:no-data", 12.0));
    let provider = WithReports::new(feed, PatternSignalProvider::new());
    let estimator = BlendingEstimator::new(provider, BlendConfig::default());

    let estimate = expect_estimate(estimator.estimate("loc:no-data").await.unwrap());
    assert_eq!(estimate.estimated_wait_minutes, 12.0);
}

#[tokio::test]
async fn test_estimator_blends_feed_with_fixed_baseline() {
    let provider = PatternSignalProvider::without_rules()
        .with_rule("^loc:cafe$", SignalBehavior::Baseline(baseline(10.0, 2.0)))
        .unwrap();
    let mut feed = ReportFeed::new();
    feed.push(wait_report("loc:cafe", 30.0));
    let estimator =
        BlendingEstimator::new(WithReports::new(feed, provider), BlendConfig::default());

    let estimate = expect_estimate(estimator.estimate("loc:cafe").await.unwrap());
    // 0.2 * 30 + 0.8 * 10
    assert!((estimate.estimated_wait_minutes - 14.0).abs() < 1e-9);
}

#[test]
fn test_huge_reports_average_without_overflow() {
    let blend = BlendConfig::default();
    let reports = [wait_report("l", 1e308), wait_report("l", 1e308)];
    let estimate = expect_estimate(combine(&blend, &reports, None));

    assert!(estimate.is_finite());
    assert_eq!(estimate.estimated_wait_minutes, 1e308);
    assert_eq!(estimate.entry_probability, 0.0);
}

#[tokio::test]
async fn test_estimator_rejects_non_finite_interval() {
    let mut feed = ReportFeed::new();
    feed.push(wait_report("loc:no-data", 1e308));
    let blend = BlendConfig {
        relative_half_width: 10.0,
        ..BlendConfig::default()
    };
    let provider = WithReports::new(feed, PatternSignalProvider::new());
    let estimator = BlendingEstimator::new(provider, blend);

    match estimator.estimate("loc:no-data").await {
        Err(ForecastError::EstimationFailed { reason, .. }) => {
            assert!(reason.contains("finite"));
        }
        other => panic!("Expected EstimationFailed, got {:?}", other),
    }
}
