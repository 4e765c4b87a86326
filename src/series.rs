//! Temporally ordered, possibly multivariate numeric series.
//!
//! A [`Series`] stores `n` observations of dimension `d` in row-major order.
//! Row order is time order. Engines never mutate a series; permutations and
//! sub-windows are produced as new values.

use crate::errors::{validate_all_finite, IndependenceError, IndependenceResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered sequence of real scalars or real vectors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "FlatSeries"))]
pub struct Series {
    data: Vec<f64>,
    len: usize,
    dim: usize,
}

impl Series {
    /// Build a univariate series from scalar observations.
    ///
    /// # Errors
    /// * `DimensionError` if `values` is empty
    pub fn univariate(values: Vec<f64>) -> IndependenceResult<Self> {
        if values.is_empty() {
            return Err(IndependenceError::dimension("series must contain at least one observation"));
        }
        let len = values.len();
        Ok(Self {
            data: values,
            len,
            dim: 1,
        })
    }

    /// Build a multivariate series from one vector per time step.
    ///
    /// # Errors
    /// * `DimensionError` if there are no rows, a row is empty, or rows differ in length
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> IndependenceResult<Self> {
        let first = rows
            .first()
            .ok_or_else(|| IndependenceError::dimension("series must contain at least one observation"))?;
        let dim = first.as_ref().len();
        if dim == 0 {
            return Err(IndependenceError::dimension("series rows must have at least one column"));
        }

        let mut data = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(IndependenceError::dimension(format!(
                    "ragged series: row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            len: rows.len(),
            dim,
        })
    }

    /// Build a series from row-major storage of `len` rows with `dim` columns.
    pub fn from_flat(data: Vec<f64>, len: usize, dim: usize) -> IndependenceResult<Self> {
        if len == 0 || dim == 0 {
            return Err(IndependenceError::dimension(format!(
                "series shape must be non-empty, got {}x{}",
                len, dim
            )));
        }
        if data.len() != len * dim {
            return Err(IndependenceError::dimension(format!(
                "flat storage holds {} values but shape {}x{} needs {}",
                data.len(),
                len,
                dim,
                len * dim
            )));
        }
        Ok(Self { data, len, dim })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of columns per observation.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Observation at time `t`.
    pub fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.dim..(t + 1) * self.dim]
    }

    /// Row-major view of all values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Reject NaN and infinite values.
    pub fn validate_finite(&self, name: &str) -> IndependenceResult<()> {
        validate_all_finite(&self.data, name)
    }

    /// Contiguous sub-window `[start, start + len)`.
    pub fn window(&self, start: usize, len: usize) -> IndependenceResult<Series> {
        if len == 0 || start + len > self.len {
            return Err(IndependenceError::dimension(format!(
                "window [{}, {}) is out of bounds for a series of length {}",
                start,
                start + len,
                self.len
            )));
        }
        Ok(Series {
            data: self.data[start * self.dim..(start + len) * self.dim].to_vec(),
            len,
            dim: self.dim,
        })
    }

    /// Rows reordered so that row `t` of the result is row `order[t]` of `self`.
    ///
    /// `order` must contain valid row indices; repeated indices are allowed
    /// (block resampling draws with replacement).
    pub fn reordered(&self, order: &[usize]) -> IndependenceResult<Series> {
        if order.len() != self.len {
            return Err(IndependenceError::dimension(format!(
                "index order has {} entries, series has {} rows",
                order.len(),
                self.len
            )));
        }
        let mut data = Vec::with_capacity(self.data.len());
        for &t in order {
            if t >= self.len {
                return Err(IndependenceError::dimension(format!(
                    "row index {} out of bounds for a series of length {}",
                    t, self.len
                )));
            }
            data.extend_from_slice(self.row(t));
        }
        Ok(Series {
            data,
            len: self.len,
            dim: self.dim,
        })
    }
}

/// Serialized shape of a [`Series`], checked through [`Series::from_flat`]
/// on the way in.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct FlatSeries {
    data: Vec<f64>,
    len: usize,
    dim: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<FlatSeries> for Series {
    type Error = IndependenceError;

    fn try_from(flat: FlatSeries) -> IndependenceResult<Self> {
        Series::from_flat(flat.data, flat.len, flat.dim)
    }
}

impl TryFrom<Vec<f64>> for Series {
    type Error = IndependenceError;

    fn try_from(values: Vec<f64>) -> IndependenceResult<Self> {
        Series::univariate(values)
    }
}

impl TryFrom<&[f64]> for Series {
    type Error = IndependenceError;

    fn try_from(values: &[f64]) -> IndependenceResult<Self> {
        Series::univariate(values.to_vec())
    }
}

/// Check that two series can be compared time step by time step.
pub(crate) fn validate_pair(x: &Series, y: &Series) -> IndependenceResult<()> {
    if x.len() != y.len() {
        return Err(IndependenceError::dimension(format!(
            "X has {} observations but Y has {}",
            x.len(),
            y.len()
        )));
    }
    x.validate_finite("X")?;
    y.validate_finite("Y")
}
