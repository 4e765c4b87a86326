//! Normalized distance-correlation statistic.
//!
//! Given two centered matrices `A` and `B` of the same mode, the statistic is
//!
//! ```text
//! dCor(X, Y) = <A, B> / sqrt(<A, A> <B, B>)
//! ```
//!
//! which is the squared distance correlation for the biased estimator and its
//! bias-corrected counterpart (possibly slightly negative) for the unbiased
//! one. The normalizing constants of the two modes cancel in the ratio.

use crate::centering::{center, EstimatorMode};
use crate::distance::DistanceMatrix;
use crate::errors::{validate_finite_statistic, IndependenceError, IndependenceResult};
use crate::series::{validate_pair, Series};

/// Centered inner products `<A, B>`, `<A, A>` and `<B, B>`.
///
/// Moments of the same mode add; the fast engine pools blocks this way.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistanceMoments {
    /// `<A, B>`
    pub cross: f64,
    /// `<A, A>`
    pub var_x: f64,
    /// `<B, B>`
    pub var_y: f64,
}

impl DistanceMoments {
    /// Moments of two pre-built distance matrices.
    pub fn from_distances(
        dist_x: &DistanceMatrix,
        dist_y: &DistanceMatrix,
        mode: EstimatorMode,
    ) -> IndependenceResult<Self> {
        if dist_x.size() != dist_y.size() {
            return Err(IndependenceError::dimension(format!(
                "aligned windows differ in length: {} vs {}",
                dist_x.size(),
                dist_y.size()
            )));
        }
        let a = center(dist_x, mode)?;
        let b = center(dist_y, mode)?;
        Ok(Self {
            cross: a.inner_product(&b),
            var_x: a.inner_product(&a),
            var_y: b.inner_product(&b),
        })
    }

    /// `cross / sqrt(var_x var_y)`, or exactly `0.0` when either variance
    /// is not positive.
    pub fn correlation(&self) -> f64 {
        if self.var_x <= 0.0 || self.var_y <= 0.0 {
            return 0.0;
        }
        self.cross / (self.var_x * self.var_y).sqrt()
    }
}

impl std::ops::Add for DistanceMoments {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            cross: self.cross + other.cross,
            var_x: self.var_x + other.var_x,
            var_y: self.var_y + other.var_y,
        }
    }
}

impl std::iter::Sum for DistanceMoments {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, m| acc + m)
    }
}

/// Distance-correlation statistic of two pre-built distance matrices.
///
/// Returns exactly `0.0` when either matrix has zero distance variance
/// (for example a constant series), instead of dividing by zero.
pub fn distance_correlation(
    dist_x: &DistanceMatrix,
    dist_y: &DistanceMatrix,
    mode: EstimatorMode,
) -> IndependenceResult<f64> {
    Ok(DistanceMoments::from_distances(dist_x, dist_y, mode)?.correlation())
}

/// Distance covariance `<A, B>` scaled by the mode's normalizer.
///
/// Biased: `(1/n²) Σ A_ij B_ij`. Unbiased: `(1/(n(n-3))) Σ_{i≠j} Ã_ij B̃_ij`.
pub fn distance_covariance(
    dist_x: &DistanceMatrix,
    dist_y: &DistanceMatrix,
    mode: EstimatorMode,
) -> IndependenceResult<f64> {
    if dist_x.size() != dist_y.size() {
        return Err(IndependenceError::dimension(format!(
            "aligned windows differ in length: {} vs {}",
            dist_x.size(),
            dist_y.size()
        )));
    }
    let a = center(dist_x, mode)?;
    let b = center(dist_y, mode)?;
    let n = dist_x.size() as f64;
    let scale = match mode {
        EstimatorMode::Biased => n * n,
        EstimatorMode::Unbiased => n * (n - 3.0),
    };
    Ok(a.inner_product(&b) / scale)
}

/// Plain (non-lagged) distance correlation between two series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DCorr {
    mode: EstimatorMode,
}

impl DCorr {
    /// Test with the given estimator mode.
    pub fn new(mode: EstimatorMode) -> Self {
        Self { mode }
    }

    /// Estimator mode.
    pub fn mode(&self) -> EstimatorMode {
        self.mode
    }

    /// Distance correlation of `x` and `y`.
    ///
    /// # Errors
    /// * `DimensionError` on mismatched lengths
    /// * `ConfigurationError` when `n` is too small for the estimator
    pub fn test_statistic(&self, x: &Series, y: &Series) -> IndependenceResult<f64> {
        validate_pair(x, y)?;
        let n = x.len();
        if n < self.mode.min_samples() {
            return Err(IndependenceError::configuration(
                "n",
                format!(
                    "n must be at least {} for the {} estimator, got {}",
                    self.mode.min_samples(),
                    self.mode,
                    n
                ),
            ));
        }
        validate_finite_statistic(
            distance_correlation(
                &DistanceMatrix::rescaled(x),
                &DistanceMatrix::rescaled(y),
                self.mode,
            )?,
            "distance correlation",
            "dcorr",
        )
    }
}
