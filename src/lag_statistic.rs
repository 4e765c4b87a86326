//! Lag-aggregated cross-distance-correlation statistic.
//!
//! For `max_lag = L` the statistic is evaluated on the aligned windows
//! `X[0 .. n - l]` and `Y[l .. n]` for every `l` in `0..=L`, and the largest
//! per-lag value is reported (see [`StatisticResult::from_lags`]).
//!
//! Distance matrices are built once for the full series; each lag uses
//! principal sub-matrices of them.

use crate::centering::EstimatorMode;
use crate::dcorr::distance_correlation;
use crate::distance::{lagged_pair, DistanceMatrix};
use crate::errors::{validate_finite_statistic, IndependenceError, IndependenceResult};
use crate::results::StatisticResult;
use crate::series::{validate_pair, Series};
use log::{debug, trace};

/// Exclusive upper bound on `max_lag` for a sample of size `n`.
///
/// `n - 3` for the unbiased estimator, `n - 1` for the biased one. Negative
/// when no lag at all is admissible.
pub fn max_lag_bound(mode: EstimatorMode, n: usize) -> i64 {
    n as i64 - mode.lag_margin() as i64
}

/// Check `max_lag` against the sample size.
///
/// # Errors
/// * `ConfigurationError` with a message containing "max_lag must be less than"
pub fn validate_max_lag(mode: EstimatorMode, max_lag: usize, n: usize) -> IndependenceResult<()> {
    let bound = max_lag_bound(mode, n);
    if (max_lag as i64) < bound {
        return Ok(());
    }
    Err(IndependenceError::configuration(
        "max_lag",
        format!(
            "max_lag must be less than n - {} = {} for the {} estimator (got max_lag = {}, n = {})",
            mode.lag_margin(),
            bound,
            mode,
            max_lag,
            n
        ),
    ))
}

/// Per-lag statistics from pre-built distance matrices.
///
/// Callers validate `max_lag` first; a lag that leaves too few aligned
/// samples surfaces as a `DimensionError` from the centering step, and a
/// non-finite statistic as a `NumericalError`.
pub fn per_lag_statistics(
    dist_x: &DistanceMatrix,
    dist_y: &DistanceMatrix,
    mode: EstimatorMode,
    max_lag: usize,
) -> IndependenceResult<Vec<f64>> {
    (0..=max_lag)
        .map(|lag| {
            let (wx, wy) = lagged_pair(dist_x, dist_y, lag)?;
            let stat = validate_finite_statistic(
                distance_correlation(&wx, &wy, mode)?,
                "distance correlation",
                &format!("lag {}", lag),
            )?;
            trace!("lag {}: statistic {:.6} over {} aligned samples", lag, stat, wx.size());
            Ok(stat)
        })
        .collect()
}

/// Aggregate statistic from pre-built distance matrices.
pub fn statistic_from_distances(
    dist_x: &DistanceMatrix,
    dist_y: &DistanceMatrix,
    mode: EstimatorMode,
    max_lag: usize,
) -> IndependenceResult<StatisticResult> {
    Ok(StatisticResult::from_lags(per_lag_statistics(
        dist_x, dist_y, mode, max_lag,
    )?))
}

/// Validate inputs and compute the lag-aggregated statistic of `x` and `y`.
///
/// # Errors
/// * `DimensionError` when the series differ in length
/// * `InvalidData` for non-finite values
/// * `ConfigurationError` when `max_lag` is too large for `n`
pub fn lag_statistic(
    x: &Series,
    y: &Series,
    mode: EstimatorMode,
    max_lag: usize,
) -> IndependenceResult<StatisticResult> {
    validate_pair(x, y)?;
    validate_max_lag(mode, max_lag, x.len())?;

    let result = statistic_from_distances(
        &DistanceMatrix::rescaled(x),
        &DistanceMatrix::rescaled(y),
        mode,
        max_lag,
    )?;
    debug!(
        "{} DCorrX over n = {}, max_lag = {}: statistic {:.6} at lag {}",
        mode,
        x.len(),
        max_lag,
        result.statistic,
        result.optimal_lag
    );
    Ok(result)
}
