//! Block length rules for the resampling engines.
//!
//! Two sizes are derived here:
//!
//! - the **subsample size** of the fast engine, which must leave every block
//!   long enough for the lag sweep to centre each aligned window;
//! - the **circular block length** of the block-permutation scheme.
//!
//! The subsample size defaults to `floor(n^(2/3))`, so a null replication
//! costs about `n^(5/3)` instead of the exact engine's `n^2`. The circular
//! block length defaults to `ceil(sqrt(n))`.

use crate::centering::EstimatorMode;
use crate::errors::{IndependenceError, IndependenceResult};

/// Shortest block the lag sweep can run on.
///
/// At lag `max_lag` a block of length `m` leaves `m - max_lag` aligned
/// samples, which must reach the estimator's minimum.
pub fn min_subsample_size(mode: EstimatorMode, max_lag: usize) -> usize {
    max_lag + mode.min_samples()
}

/// Default subsample size, `floor(n^(2/3))`, the largest `m` with `m^3 <= n^2`.
pub fn default_subsample_size(n: usize) -> usize {
    let n_squared = (n as u128) * (n as u128);
    let mut m = (n as f64).powf(2.0 / 3.0).round() as u128;
    while m > 0 && m.pow(3) > n_squared {
        m -= 1;
    }
    while (m + 1).pow(3) <= n_squared {
        m += 1;
    }
    m as usize
}

/// Smallest series length whose default subsample size reaches
/// [`min_subsample_size`], i.e. the smallest `n` with `n^2 >= m_min^3`.
pub fn min_series_length(mode: EstimatorMode, max_lag: usize) -> usize {
    let cube = (min_subsample_size(mode, max_lag) as u128).pow(3);
    let mut n = (cube as f64).sqrt().floor() as u128;
    while n * n < cube {
        n += 1;
    }
    while n > 0 && (n - 1) * (n - 1) >= cube {
        n -= 1;
    }
    n as usize
}

/// Default circular block length, `ceil(sqrt(n))`, at least 1.
pub fn default_block_size(n: usize) -> usize {
    ((n as f64).sqrt().ceil() as usize).max(1)
}

/// Resolve the subsample size used by the fast engine.
///
/// # Arguments
/// * `n` - Series length
/// * `mode` - Estimator mode
/// * `max_lag` - Largest lag evaluated inside each block
/// * `explicit` - Caller-supplied size, if any
///
/// # Returns
/// * `Ok(m)` with `min_subsample_size(mode, max_lag) <= m <= n`
/// * `Err` with a message containing "n must be at least" when no default can
///   be derived, or when an explicit size is out of range
///
/// # Example
/// ```
/// use timeseries_independence::block_size::resolve_subsample_size;
/// use timeseries_independence::EstimatorMode;
///
/// assert_eq!(resolve_subsample_size(100, EstimatorMode::Unbiased, 1, None).unwrap(), 21);
/// assert!(resolve_subsample_size(15, EstimatorMode::Unbiased, 10, None).is_err());
/// ```
pub fn resolve_subsample_size(
    n: usize,
    mode: EstimatorMode,
    max_lag: usize,
    explicit: Option<usize>,
) -> IndependenceResult<usize> {
    let m_min = min_subsample_size(mode, max_lag);

    match explicit {
        Some(0) => Err(IndependenceError::configuration(
            "subsample_size",
            "subsample_size must be a positive integer, got 0",
        )),
        Some(m) if m > n => Err(IndependenceError::configuration(
            "subsample_size",
            format!("subsample_size {} exceeds the series length n = {}", m, n),
        )),
        Some(m) if m < m_min => Err(IndependenceError::configuration(
            "subsample_size",
            format!(
                "subsample_size must be at least {} for the {} estimator with max_lag = {}, got {}",
                m_min, mode, max_lag, m
            ),
        )),
        Some(m) => Ok(m),
        None => {
            let m = default_subsample_size(n);
            if m < m_min {
                return Err(IndependenceError::configuration(
                    "n",
                    format!(
                        "n must be at least {} to derive a default subsample_size of {} \
                         for the {} estimator with max_lag = {} (got n = {})",
                        min_series_length(mode, max_lag),
                        m_min,
                        mode,
                        max_lag,
                        n
                    ),
                ));
            }
            Ok(m)
        }
    }
}

/// Resolve the circular block length for a series of length `n`.
pub fn resolve_block_size(n: usize, explicit: Option<usize>) -> IndependenceResult<usize> {
    match explicit {
        None => Ok(default_block_size(n)),
        Some(b) if b == 0 || b > n => Err(IndependenceError::configuration(
            "block_size",
            format!("block_size must be between 1 and n = {}, got {}", n, b),
        )),
        Some(b) => Ok(b),
    }
}
