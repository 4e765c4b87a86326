//! Double-centering and U-centering of distance matrices.
//!
//! The estimator mode selects how a [`DistanceMatrix`] is centered before the
//! inner-product statistic is formed:
//!
//! - **Biased** (classical double-centering):
//!   `A_ij = a_ij - ā_i. - ā_.j + ā..`
//! - **Unbiased** (U-centering, Székely & Rizzo 2014):
//!   `Ã_ij = a_ij - a_i./(n-2) - a_.j/(n-2) + a../((n-1)(n-2))` for `i != j`,
//!   `Ã_ii = 0`. Only defined for `n > 3`.

use crate::distance::DistanceMatrix;
use crate::errors::{IndependenceError, IndependenceResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estimator mode of the distance-correlation statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EstimatorMode {
    /// Double-centered (V-statistic) estimator
    Biased,
    /// U-centered, bias-corrected estimator
    Unbiased,
}

impl EstimatorMode {
    /// Configuration string for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatorMode::Biased => "biased",
            EstimatorMode::Unbiased => "unbiased",
        }
    }

    /// Smallest number of aligned samples the centering rule accepts.
    pub fn min_samples(&self) -> usize {
        match self {
            EstimatorMode::Biased => 2,
            EstimatorMode::Unbiased => 4,
        }
    }

    /// The `k` in the lag bound `max_lag < n - k`.
    pub fn lag_margin(&self) -> usize {
        self.min_samples() - 1
    }
}

impl fmt::Display for EstimatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimatorMode {
    type Err = IndependenceError;

    fn from_str(which_test: &str) -> IndependenceResult<Self> {
        match which_test {
            "biased" => Ok(EstimatorMode::Biased),
            "unbiased" => Ok(EstimatorMode::Unbiased),
            other => Err(IndependenceError::configuration(
                "which_test",
                format!("which_test must be 'biased' or 'unbiased', got '{}'", other),
            )),
        }
    }
}

/// A distance matrix after centering; same shape as its source.
#[derive(Debug, Clone, PartialEq)]
pub struct CenteredMatrix {
    values: Vec<f64>,
    n: usize,
    mode: EstimatorMode,
}

impl CenteredMatrix {
    /// Side length.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Mode used to produce this matrix.
    pub fn mode(&self) -> EstimatorMode {
        self.mode
    }

    /// Entry `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Row-major view.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Frobenius inner product `Σ_ij A_ij B_ij`.
    pub fn inner_product(&self, other: &CenteredMatrix) -> f64 {
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Center `dist` according to `mode`.
///
/// # Errors
/// * `DimensionError` when the matrix is smaller than [`EstimatorMode::min_samples`]
pub fn center(dist: &DistanceMatrix, mode: EstimatorMode) -> IndependenceResult<CenteredMatrix> {
    let n = dist.size();
    if n < mode.min_samples() {
        return Err(IndependenceError::dimension(format!(
            "{} centering needs at least {} samples, got {}",
            mode,
            mode.min_samples(),
            n
        )));
    }

    let values = match mode {
        EstimatorMode::Biased => double_center(dist),
        EstimatorMode::Unbiased => u_center(dist),
    };
    Ok(CenteredMatrix { values, n, mode })
}

fn row_sums(dist: &DistanceMatrix) -> Vec<f64> {
    let n = dist.size();
    dist.as_slice().chunks(n).map(|row| row.iter().sum()).collect()
}

fn double_center(dist: &DistanceMatrix) -> Vec<f64> {
    let n = dist.size();
    let nf = n as f64;
    // Symmetric input: row means equal column means.
    let sums = row_sums(dist);
    let means: Vec<f64> = sums.iter().map(|s| s / nf).collect();
    let grand = sums.iter().sum::<f64>() / (nf * nf);

    let mut values = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            values.push(dist.get(i, j) - means[i] - means[j] + grand);
        }
    }
    values
}

fn u_center(dist: &DistanceMatrix) -> Vec<f64> {
    let n = dist.size();
    let nf = n as f64;
    let sums = row_sums(dist);
    let scaled: Vec<f64> = sums.iter().map(|s| s / (nf - 2.0)).collect();
    let grand = sums.iter().sum::<f64>() / ((nf - 1.0) * (nf - 2.0));

    let mut values = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            if i == j {
                values.push(0.0);
            } else {
                values.push(dist.get(i, j) - scaled[i] - scaled[j] + grand);
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Series;
    use assert_approx_eq::assert_approx_eq;

    fn four_point_distances() -> DistanceMatrix {
        DistanceMatrix::euclidean(&Series::univariate(vec![0.0, 1.0, 3.0, 6.0]).unwrap())
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("biased".parse::<EstimatorMode>().unwrap(), EstimatorMode::Biased);
        assert_eq!("unbiased".parse::<EstimatorMode>().unwrap(), EstimatorMode::Unbiased);

        let err = "notbiased".parse::<EstimatorMode>().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("which_test"));
        assert!(err.to_string().contains("notbiased"));

        // Parsing is exact, including case.
        assert!("Biased".parse::<EstimatorMode>().is_err());
    }

    #[test]
    fn test_mode_round_trips_through_display() {
        for mode in [EstimatorMode::Biased, EstimatorMode::Unbiased] {
            assert_eq!(mode.to_string().parse::<EstimatorMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_double_centering_known_values() {
        let c = center(&four_point_distances(), EstimatorMode::Biased).unwrap();
        let expected = [
            [-2.5, -1.0, 1.0, 2.5],
            [-1.0, -1.5, 0.5, 2.0],
            [1.0, 0.5, -1.5, 0.0],
            [2.5, 2.0, 0.0, -4.5],
        ];
        for i in 0..4 {
            for j in 0..4 {
                assert_approx_eq!(c.get(i, j), expected[i][j], 1e-12);
            }
        }
    }

    #[test]
    fn test_double_centering_rows_and_columns_sum_to_zero() {
        let s = Series::from_rows(&[[0.2, 1.0], [1.5, -0.3], [2.2, 2.4], [-1.0, 0.7], [0.4, 0.4]])
            .unwrap();
        let c = center(&DistanceMatrix::euclidean(&s), EstimatorMode::Biased).unwrap();
        for i in 0..5 {
            let row: f64 = (0..5).map(|j| c.get(i, j)).sum();
            let col: f64 = (0..5).map(|j| c.get(j, i)).sum();
            assert_approx_eq!(row, 0.0, 1e-12);
            assert_approx_eq!(col, 0.0, 1e-12);
        }
    }

    #[test]
    fn test_u_centering_known_values() {
        let c = center(&four_point_distances(), EstimatorMode::Unbiased).unwrap();
        let third = 2.0 / 3.0;
        let expected = [
            [0.0, -2.0 * third, third, third],
            [-2.0 * third, 0.0, third, third],
            [third, third, 0.0, -2.0 * third],
            [third, third, -2.0 * third, 0.0],
        ];
        for i in 0..4 {
            for j in 0..4 {
                assert_approx_eq!(c.get(i, j), expected[i][j], 1e-12);
            }
        }
    }

    #[test]
    fn test_u_centering_zero_diagonal_and_zero_row_sums() {
        let s = Series::univariate(vec![0.5, -1.5, 2.0, 4.5, 3.0, -0.25]).unwrap();
        let c = center(&DistanceMatrix::euclidean(&s), EstimatorMode::Unbiased).unwrap();
        for i in 0..6 {
            assert_eq!(c.get(i, i), 0.0);
            let row: f64 = (0..6).map(|j| c.get(i, j)).sum();
            assert_approx_eq!(row, 0.0, 1e-12);
        }
    }

    #[test]
    fn test_centering_is_deterministic() {
        let d = four_point_distances();
        let a = center(&d, EstimatorMode::Unbiased).unwrap();
        let b = center(&d, EstimatorMode::Unbiased).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unbiased_requires_more_than_three_samples() {
        let d = DistanceMatrix::euclidean(&Series::univariate(vec![1.0, 2.0, 3.0]).unwrap());
        assert!(center(&d, EstimatorMode::Unbiased).unwrap_err().is_dimension_error());
        assert!(center(&d, EstimatorMode::Biased).is_ok());
    }
}
