//! Integration tests for the public DCorrX surface
//!
//! These tests exercise construction, statistic evaluation and p-value
//! evaluation through the crate's re-exported API only.

use assert_approx_eq::assert_approx_eq;
use timeseries_independence::{
    DCorrX, ErrorKind, IndependenceError, PValueMethod, PValueOptions, PermutationScheme,
    SecureRng, Series, TestRegistry,
};

fn multivariate_x() -> Series {
    Series::from_rows(&[
        [0.1, 1.2],
        [0.9, 0.3],
        [1.7, 2.2],
        [2.4, 1.1],
        [3.3, 3.0],
        [2.8, 0.4],
        [4.1, 2.6],
        [5.0, 1.9],
    ])
    .unwrap()
}

fn univariate_y() -> Series {
    Series::univariate(vec![0.5, 1.1, 0.7, 2.3, 1.9, 3.5, 2.2, 4.0]).unwrap()
}

fn ramp(n: usize) -> Series {
    Series::univariate((0..n).map(|i| i as f64).collect()).unwrap()
}

/// Test scenario: an unrecognized estimator name
///
/// Construction must fail before any data is seen.
#[test]
fn test_invalid_which_test() {
    let err = DCorrX::new("notbiased", 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("which_test"));
}

#[test]
fn test_get_name() {
    for which_test in ["biased", "unbiased"] {
        assert_eq!(DCorrX::new(which_test, 0).unwrap().get_name(), which_test);
    }
}

#[test]
fn test_unbiased_max_lag_bound() {
    let test = DCorrX::new("unbiased", 0).unwrap();
    let x = ramp(3);
    match test.test_statistic(&x, &x) {
        Err(IndependenceError::ConfigurationError { message, .. }) => {
            assert!(message.contains("max_lag must be less than"));
        }
        other => panic!("Expected ConfigurationError, got {:?}", other),
    }

    // max_lag >= n - 3 fails, max_lag = n - 4 succeeds.
    let x = ramp(12);
    assert!(DCorrX::new("unbiased", 9).unwrap().test_statistic(&x, &x).is_err());
    assert!(DCorrX::new("unbiased", 8).unwrap().test_statistic(&x, &x).is_ok());
}

#[test]
fn test_constant_series_statistic_is_zero() {
    let constant = Series::univariate(vec![2.5; 12]).unwrap();
    let other = Series::univariate(vec![
        0.3, -1.2, 2.5, 0.4, -0.7, 1.9, -2.2, 0.8, 1.4, -0.1, 0.6, -1.5,
    ])
    .unwrap();
    for which_test in ["biased", "unbiased"] {
        for max_lag in 0..=4 {
            let test = DCorrX::new(which_test, max_lag).unwrap();
            assert_eq!(test.test_statistic(&constant, &other).unwrap().statistic, 0.0);
            assert_eq!(test.test_statistic(&other, &constant).unwrap().statistic, 0.0);
        }
    }
}

#[test]
fn test_reference_statistics_at_lag_zero() {
    let (x, y) = (multivariate_x(), univariate_y());
    let unbiased = DCorrX::new("unbiased", 0).unwrap().test_statistic(&x, &y).unwrap();
    let biased = DCorrX::new("biased", 0).unwrap().test_statistic(&x, &y).unwrap();
    assert_approx_eq!(unbiased.statistic, 0.39913233864351305, 1e-9);
    assert_approx_eq!(biased.statistic, 0.6346274894026478, 1e-9);
}

#[test]
fn test_lag_metadata() {
    let result = DCorrX::new("biased", 2)
        .unwrap()
        .test_statistic(&multivariate_x(), &univariate_y())
        .unwrap();
    assert_eq!(result.dependence_by_lag.len(), 3);
    assert_eq!(result.optimal_lag, 1);
    assert_approx_eq!(result.statistic, 0.922757545419291, 1e-9);
}

#[test]
fn test_mismatched_lengths() {
    let err = DCorrX::new("biased", 0)
        .unwrap()
        .test_statistic(&ramp(10), &ramp(9))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dimension);
}

#[test]
fn test_non_finite_input_is_rejected() {
    let bad = Series::univariate(vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0]).unwrap();
    let err = DCorrX::new("biased", 0)
        .unwrap()
        .test_statistic(&bad, &ramp(6))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[test]
fn test_fast_mode_requires_enough_samples() {
    let test = DCorrX::new("unbiased", 10).unwrap();
    let x = ramp(15);
    let mut rng = SecureRng::with_seed(1);
    let err = test
        .p_value(&x, &x, &PValueOptions::fast(), &mut rng)
        .unwrap_err();
    assert!(err.is_configuration_error());
    assert!(err.to_string().contains("n must be at least"));
}

#[test]
fn test_p_value_determinism() {
    let test = DCorrX::new("unbiased", 1).unwrap();
    let x = Series::univariate((0..30).map(|t| (t as f64 * 0.9).sin()).collect()).unwrap();
    let y = Series::univariate((0..30).map(|t| ((t * 7) % 11) as f64).collect()).unwrap();

    for options in [
        PValueOptions::exact(50),
        PValueOptions::exact(50).with_scheme(PermutationScheme::CircularBlock { block_size: Some(3) }),
        PValueOptions::fast().with_replication_factor(50),
    ] {
        let a = test.p_value(&x, &y, &options, &mut SecureRng::with_seed(31)).unwrap();
        let b = test.p_value(&x, &y, &options, &mut SecureRng::with_seed(31)).unwrap();
        assert_eq!(a, b);
        assert!(a.p_value > 0.0 && a.p_value <= 1.0);
    }
}

#[test]
fn test_p_value_method_metadata() {
    let test = DCorrX::new("biased", 1).unwrap();
    let x = ramp(36);
    let options = PValueOptions::fast().with_replication_factor(10).with_seed(5);
    let result = test.p_value_with_options(&x, &x, &options).unwrap();
    assert_eq!(
        result.method,
        PValueMethod::FastSubsampling {
            subsample_size: 10,
            num_blocks: 3
        }
    );
}

/// Test scenario: finite inputs near the limits of f64
///
/// Statistics and null distributions stay finite, and every requested
/// replication enters the p-value.
#[test]
fn test_extreme_magnitudes() {
    let x = Series::univariate(vec![1e200, -1e200, 3e199, 7e199, -4e199, 2e200, -9e199, 5e199])
        .unwrap();
    let y = univariate_y();
    let test = DCorrX::new("biased", 1).unwrap();

    let stat = test.test_statistic(&x, &y).unwrap();
    assert!(stat.statistic.is_finite());
    assert!(stat.dependence_by_lag.iter().all(|s| s.is_finite()));

    let result = test
        .p_value(&x, &y, &PValueOptions::exact(50), &mut SecureRng::with_seed(2))
        .unwrap();
    assert_eq!(result.null_summary.replications, 50);
    assert_eq!(result.observed, stat);
}

#[test]
fn test_registry_dispatch() {
    let registry = TestRegistry::default();
    let test = registry
        .create("dcorrx", "unbiased".parse().unwrap(), 2)
        .unwrap();
    let result = test.test_statistic(&multivariate_x(), &univariate_y()).unwrap();
    assert_eq!(result.optimal_lag, 1);
    assert!(registry
        .create("mantel", "biased".parse().unwrap(), 0)
        .is_err());
}
