//! Pairwise Euclidean distance matrices.
//!
//! A [`DistanceMatrix`] is built once per series per evaluation. Lagged
//! windows are principal sub-matrices of the full matrix, so a lag sweep
//! never recomputes distances.

use crate::errors::{IndependenceError, IndependenceResult};
use crate::series::Series;

/// Symmetric, zero-diagonal, non-negative `n x n` matrix (row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    values: Vec<f64>,
    n: usize,
}

impl DistanceMatrix {
    /// Euclidean distances between every pair of observations in `series`.
    pub fn euclidean(series: &Series) -> Self {
        Self::scaled_euclidean(series, 1.0)
    }

    /// Euclidean distances of `series` divided by a power of two chosen so
    /// that the largest magnitude in the series lies in `[0.5, 1)`.
    ///
    /// Distance correlation is unchanged by rescaling either series, and a
    /// power-of-two factor is exact, so this equals [`euclidean`] up to that
    /// factor for ordinary data while staying finite, and free of underflow,
    /// for any finite input magnitude.
    ///
    /// [`euclidean`]: DistanceMatrix::euclidean
    pub fn rescaled(series: &Series) -> Self {
        Self::scaled_euclidean(series, power_of_two_scale(series.as_slice()))
    }

    /// Rescaled distances of the window `[start, start + len)` of `series`,
    /// using the factor of the whole series so that windows share one scale.
    pub fn rescaled_window(series: &Series, start: usize, len: usize) -> IndependenceResult<Self> {
        let scale = power_of_two_scale(series.as_slice());
        Ok(Self::scaled_euclidean(&series.window(start, len)?, scale))
    }

    fn scaled_euclidean(series: &Series, scale: f64) -> Self {
        let n = series.len();
        let mut values = vec![0.0; n * n];

        for i in 0..n {
            let row_i = series.row(i);
            for j in (i + 1)..n {
                let d = row_i
                    .iter()
                    .zip(series.row(j))
                    .map(|(a, b)| {
                        let diff = a * scale - b * scale;
                        diff * diff
                    })
                    .sum::<f64>()
                    .sqrt();
                values[i * n + j] = d;
                values[j * n + i] = d;
            }
        }

        Self { values, n }
    }

    /// Wrap a precomputed matrix, checking the distance-matrix invariants.
    pub fn from_values(values: Vec<f64>, n: usize) -> IndependenceResult<Self> {
        if n == 0 || values.len() != n * n {
            return Err(IndependenceError::dimension(format!(
                "distance matrix storage has {} values, expected {}x{}",
                values.len(),
                n,
                n
            )));
        }
        for i in 0..n {
            if values[i * n + i] != 0.0 {
                return Err(IndependenceError::dimension(format!(
                    "distance matrix diagonal entry {} is {}, expected 0",
                    i,
                    values[i * n + i]
                )));
            }
            for j in (i + 1)..n {
                let (a, b) = (values[i * n + j], values[j * n + i]);
                if a != b || !(a >= 0.0) {
                    return Err(IndependenceError::dimension(format!(
                        "distance matrix entries ({}, {}) must be equal and non-negative, got {} and {}",
                        i, j, a, b
                    )));
                }
            }
        }
        Ok(Self { values, n })
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Entry `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Principal sub-matrix over observations `[start, start + len)`.
    pub fn window(&self, start: usize, len: usize) -> IndependenceResult<DistanceMatrix> {
        if len == 0 || start + len > self.n {
            return Err(IndependenceError::dimension(format!(
                "distance window [{}, {}) is out of bounds for size {}",
                start,
                start + len,
                self.n
            )));
        }
        let mut values = Vec::with_capacity(len * len);
        for i in start..start + len {
            values.extend_from_slice(&self.values[i * self.n + start..i * self.n + start + len]);
        }
        Ok(DistanceMatrix { values, n: len })
    }

    /// Distances of the series whose observation `t` is observation
    /// `order[t]` of the original.
    ///
    /// `order` may repeat indices (block resampling); repeated observations
    /// are at distance 0 from each other.
    pub fn reindexed(&self, order: &[usize]) -> IndependenceResult<DistanceMatrix> {
        if let Some(&bad) = order.iter().find(|&&i| i >= self.n) {
            return Err(IndependenceError::dimension(format!(
                "reindex position {} is out of bounds for size {}",
                bad, self.n
            )));
        }
        let len = order.len();
        let mut values = Vec::with_capacity(len * len);
        for &i in order {
            let row = &self.values[i * self.n..(i + 1) * self.n];
            values.extend(order.iter().map(|&j| row[j]));
        }
        Ok(DistanceMatrix { values, n: len })
    }

    /// Row-major view.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Distance matrices of the aligned windows `X[0 .. n - lag]` and `Y[lag .. n]`.
///
/// Both returned matrices have side `n - lag`.
pub fn lagged_pair(
    dist_x: &DistanceMatrix,
    dist_y: &DistanceMatrix,
    lag: usize,
) -> IndependenceResult<(DistanceMatrix, DistanceMatrix)> {
    let n = dist_x.size();
    if dist_y.size() != n {
        return Err(IndependenceError::dimension(format!(
            "distance matrices differ in size: {} vs {}",
            n,
            dist_y.size()
        )));
    }
    if lag >= n {
        return Err(IndependenceError::dimension(format!(
            "lag {} leaves no aligned samples for n = {}",
            lag, n
        )));
    }
    let aligned = n - lag;
    Ok((dist_x.window(0, aligned)?, dist_y.window(lag, aligned)?))
}
