//! Monte Carlo permutation testing.
//!
//! The exact engine keeps X in place and resamples the rows of Y, destroying
//! the cross-series alignment while preserving X's temporal structure. Each
//! replication recomputes the lag-aggregated statistic, and the observed
//! statistic is compared with the resulting null distribution through a
//! smoothed upper-tail p-value.
//!
//! ## Reproducibility
//!
//! One `u64` base seed is drawn from the caller's generator. Replication `r`
//! runs on its own [`SecureRng`] seeded with
//! [`mix_seed`](crate::secure_rng::mix_seed)`(base, r)`, so the
//! null distribution depends only on the caller's generator state, never on
//! thread scheduling when the `parallel` feature is enabled.

use crate::block_size::resolve_block_size;
use crate::centering::EstimatorMode;
use crate::distance::DistanceMatrix;
use crate::errors::{validate_finite_statistic, validate_positive, IndependenceResult};
use crate::lag_statistic::{statistic_from_distances, validate_max_lag};
use crate::results::{NullSummary, PValueMethod, PValueResult};
use crate::secure_rng::{replication_rng, SecureRng};
use crate::series::{validate_pair, Series};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Significance level used for the critical value in [`NullSummary`].
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Quantile probabilities are clamped this far inside (0, 1).
const QUANTILE_EPSILON: f64 = 1e-12;

/// How the rows of Y are resampled under the null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PermutationScheme {
    /// Uniform random permutation of all rows
    #[default]
    Full,
    /// Circular block resampling; keeps Y's short-range autocorrelation
    CircularBlock {
        /// Block length, `ceil(sqrt(n))` when `None`
        block_size: Option<usize>,
    },
}

/// Uniformly random permutation of `0..n` (Fisher-Yates).
pub fn permutation_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

/// Circular block resample of `0..n`.
///
/// Blocks of `block_size` consecutive indices (wrapping modulo `n`) start at
/// uniformly drawn positions and are concatenated until `n` indices are
/// collected.
pub fn circular_block_indices<R: Rng + ?Sized>(
    n: usize,
    block_size: usize,
    rng: &mut R,
) -> Vec<usize> {
    if n == 0 || block_size == 0 {
        return Vec::new();
    }
    let mut order = Vec::with_capacity(n + block_size);
    while order.len() < n {
        let start = rng.gen_range(0..n);
        order.extend((0..block_size).map(|k| (start + k) % n));
    }
    order.truncate(n);
    order
}

/// Null statistics collected from the Monte Carlo replications.
#[derive(Debug, Clone, PartialEq)]
pub struct NullDistribution {
    statistics: Vec<f64>,
}

impl NullDistribution {
    /// Collect null statistics in replication order.
    ///
    /// # Errors
    /// `NumericalError` naming the first replication whose statistic is not
    /// finite; the p-value denominator is always the full replication count.
    pub fn from_statistics(statistics: Vec<f64>) -> IndependenceResult<Self> {
        for (r, &s) in statistics.iter().enumerate() {
            validate_finite_statistic(s, "null statistic", &format!("replication {}", r))?;
        }
        Ok(Self { statistics })
    }

    /// Number of replications.
    pub fn len(&self) -> usize {
        self.statistics.len()
    }

    /// True when there are no replications.
    pub fn is_empty(&self) -> bool {
        self.statistics.is_empty()
    }

    /// Smoothed upper-tail p-value `(1 + #{null >= observed}) / (1 + R)`.
    ///
    /// Never zero; equals 1 when every null statistic reaches `observed`.
    pub fn p_value_upper(&self, observed: f64) -> f64 {
        let count = self.statistics.iter().filter(|&&s| s >= observed).count() as f64;
        (count + 1.0) / (self.statistics.len() as f64 + 1.0)
    }

    /// Upper `alpha` critical value (type-7 quantile at `1 - alpha`).
    ///
    /// NaN for an empty distribution.
    pub fn critical_value(&self, alpha: f64) -> f64 {
        if self.statistics.is_empty() {
            return f64::NAN;
        }
        let mut sorted = self.statistics.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        quantile_type7(&sorted, 1.0 - alpha)
    }

    /// Mean of the null statistics.
    pub fn mean(&self) -> f64 {
        self.statistics.iter().mean()
    }

    /// Sample standard deviation; 0 with fewer than two statistics.
    pub fn std_dev(&self) -> f64 {
        if self.statistics.len() < 2 {
            return 0.0;
        }
        self.statistics.iter().std_dev()
    }

    /// Summary reported alongside a p-value.
    pub fn summary(&self) -> NullSummary {
        NullSummary {
            replications: self.len(),
            mean: self.mean(),
            std_dev: self.std_dev(),
            critical_value: self.critical_value(DEFAULT_SIGNIFICANCE_LEVEL),
        }
    }
}

/// Hyndman-Fan type-7 quantile of sorted data.
fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    let p = p.clamp(QUANTILE_EPSILON, 1.0 - QUANTILE_EPSILON);
    let h = p * (sorted.len() as f64 - 1.0);
    let lo = h.floor() as usize;
    let frac = h - lo as f64;
    if lo + 1 < sorted.len() {
        sorted[lo] * (1.0 - frac) + sorted[lo + 1] * frac
    } else {
        sorted[lo.min(sorted.len() - 1)]
    }
}

/// Run `replications` independent replications of `statistic_fn`.
///
/// Replication `r` receives [`replication_rng`]`(base_seed, r)`. The first
/// error, including a non-finite statistic, aborts the run.
pub(crate) fn run_replications<F>(
    replications: usize,
    base_seed: u64,
    statistic_fn: F,
) -> IndependenceResult<NullDistribution>
where
    F: Fn(&mut SecureRng) -> IndependenceResult<f64> + Sync,
{
    let replicate = |r: usize| {
        let mut rng = replication_rng(base_seed, r);
        statistic_fn(&mut rng)
    };

    #[cfg(feature = "parallel")]
    let statistics: Vec<f64> = {
        use rayon::prelude::*;
        (0..replications)
            .into_par_iter()
            .map(replicate)
            .collect::<IndependenceResult<Vec<f64>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let statistics: Vec<f64> = (0..replications)
        .map(replicate)
        .collect::<IndependenceResult<Vec<f64>>>()?;

    NullDistribution::from_statistics(statistics)
}

/// Exact permutation p-value of the lag-aggregated statistic.
///
/// # Arguments
/// * `x`, `y` - Series of equal length; neither is modified
/// * `mode` - Estimator mode
/// * `max_lag` - Largest lag evaluated
/// * `replication_factor` - Number of null replications, at least 1
/// * `scheme` - How Y is resampled
/// * `rng` - Source of the base seed
///
/// # Returns
/// * `Ok(PValueResult)` with `p = (1 + #{null >= observed}) / (1 + R)`
/// * `Err` on mismatched inputs, an invalid `max_lag`, invalid scheme
///   parameters or a non-finite observed or null statistic
pub fn permutation_p_value<R: Rng + ?Sized>(
    x: &Series,
    y: &Series,
    mode: EstimatorMode,
    max_lag: usize,
    replication_factor: usize,
    scheme: PermutationScheme,
    rng: &mut R,
) -> IndependenceResult<PValueResult> {
    validate_pair(x, y)?;
    validate_max_lag(mode, max_lag, x.len())?;
    validate_positive(replication_factor, "replication_factor")?;

    let n = x.len();
    let (block_size, method) = match scheme {
        PermutationScheme::Full => (None, PValueMethod::Permutation),
        PermutationScheme::CircularBlock { block_size } => {
            let b = resolve_block_size(n, block_size)?;
            (Some(b), PValueMethod::CircularBlock { block_size: b })
        }
    };

    let dist_x = DistanceMatrix::rescaled(x);
    let dist_y = DistanceMatrix::rescaled(y);
    let observed = statistic_from_distances(&dist_x, &dist_y, mode, max_lag)?;

    let base_seed: u64 = rng.gen();
    let null = run_replications(replication_factor, base_seed, |rep_rng| {
        let order = match block_size {
            None => permutation_indices(n, rep_rng),
            Some(b) => circular_block_indices(n, b, rep_rng),
        };
        let resampled = dist_y.reindexed(&order)?;
        Ok(statistic_from_distances(&dist_x, &resampled, mode, max_lag)?.statistic)
    })?;

    let p_value = null.p_value_upper(observed.statistic);
    debug!(
        "{:?} p-value {:.4} from {} replications (observed {:.6} at lag {})",
        method,
        p_value,
        null.len(),
        observed.statistic,
        observed.optimal_lag
    );

    Ok(PValueResult {
        p_value,
        observed,
        method,
        null_summary: null.summary(),
    })
}
