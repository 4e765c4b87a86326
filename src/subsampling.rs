//! Fast subsampling approximation of the permutation test.
//!
//! The series are cut into `B = floor(n / m)` contiguous, non-overlapping
//! blocks that together cover all `n` samples, each holding between `m` and
//! `2m - 1` of them. The lag sweep runs inside every block, and for each lag
//! the centered inner products of the blocks are pooled into one
//! correlation; the largest pooled value is the test statistic. Null
//! replications permute Y's rows inside every block independently, so each
//! replication costs `B` small block evaluations instead of one `n x n`
//! evaluation.
//!
//! With the default `m = floor(n^(2/3))` a replication is roughly `n^(5/3)`
//! work rather than `n^2`.

use crate::block_size::resolve_subsample_size;
use crate::centering::EstimatorMode;
use crate::dcorr::DistanceMoments;
use crate::distance::{lagged_pair, DistanceMatrix};
use crate::errors::{validate_finite_statistic, validate_positive, IndependenceResult};
use crate::lag_statistic::validate_max_lag;
use crate::monte_carlo::{permutation_indices, run_replications};
use crate::results::{PValueMethod, PValueResult, StatisticResult};
use crate::series::{validate_pair, Series};
use log::debug;
use rand::Rng;

/// Block partition of a pair of series.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsamplePlan {
    /// Shortest block length
    pub subsample_size: usize,
    /// Number of blocks
    pub num_blocks: usize,
    /// Number of samples partitioned
    pub series_len: usize,
}

impl SubsamplePlan {
    /// Partition `n` samples into `floor(n / subsample_size)` blocks of
    /// near-equal length.
    pub fn new(n: usize, subsample_size: usize) -> Self {
        let num_blocks = if subsample_size == 0 { 0 } else { n / subsample_size };
        Self {
            subsample_size,
            num_blocks,
            series_len: n,
        }
    }

    /// `(start, len)` of every block, in time order.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (n, b) = (self.series_len, self.num_blocks);
        (0..b).map(move |k| {
            let start = k * n / b;
            (start, (k + 1) * n / b - start)
        })
    }
}

/// Pool block moments per lag and aggregate by maximum.
fn pooled_statistic<'a, I>(
    blocks: I,
    mode: EstimatorMode,
    max_lag: usize,
) -> IndependenceResult<StatisticResult>
where
    I: Iterator<Item = (&'a DistanceMatrix, &'a DistanceMatrix)>,
{
    let mut pooled = vec![DistanceMoments::default(); max_lag + 1];
    for (bx, by) in blocks {
        for (lag, total) in pooled.iter_mut().enumerate() {
            let (wx, wy) = lagged_pair(bx, by, lag)?;
            *total = *total + DistanceMoments::from_distances(&wx, &wy, mode)?;
        }
    }
    let per_lag = pooled
        .iter()
        .enumerate()
        .map(|(lag, m)| {
            validate_finite_statistic(
                m.correlation(),
                "pooled distance correlation",
                &format!("lag {}", lag),
            )
        })
        .collect::<IndependenceResult<Vec<f64>>>()?;
    Ok(StatisticResult::from_lags(per_lag))
}

/// Approximate p-value from the block-subsampled statistic.
///
/// # Arguments
/// * `x`, `y` - Series of equal length; neither is modified
/// * `mode` - Estimator mode
/// * `max_lag` - Largest lag evaluated inside each block
/// * `replication_factor` - Number of null replications, at least 1
/// * `subsample_size` - Shortest block length; `floor(n^(2/3))` when `None`
/// * `rng` - Source of the base seed
///
/// # Returns
/// * `Ok(PValueResult)` whose `observed` field holds the pooled statistic
/// * `Err` with "n must be at least" when `n` is too small to derive a block
///   length, or when any other argument is invalid
pub fn fast_p_value<R: Rng + ?Sized>(
    x: &Series,
    y: &Series,
    mode: EstimatorMode,
    max_lag: usize,
    replication_factor: usize,
    subsample_size: Option<usize>,
    rng: &mut R,
) -> IndependenceResult<PValueResult> {
    validate_pair(x, y)?;
    validate_max_lag(mode, max_lag, x.len())?;
    validate_positive(replication_factor, "replication_factor")?;

    let n = x.len();
    let m = resolve_subsample_size(n, mode, max_lag, subsample_size)?;
    let plan = SubsamplePlan::new(n, m);

    let blocks = plan
        .blocks()
        .map(|(start, len)| -> IndependenceResult<(DistanceMatrix, DistanceMatrix)> {
            Ok((
                DistanceMatrix::rescaled_window(x, start, len)?,
                DistanceMatrix::rescaled_window(y, start, len)?,
            ))
        })
        .collect::<IndependenceResult<Vec<_>>>()?;

    let observed = pooled_statistic(blocks.iter().map(|(bx, by)| (bx, by)), mode, max_lag)?;

    let base_seed: u64 = rng.gen();
    let null = run_replications(replication_factor, base_seed, |rep_rng| {
        let shuffled = blocks
            .iter()
            .map(|(_, by)| by.reindexed(&permutation_indices(by.size(), rep_rng)))
            .collect::<IndependenceResult<Vec<DistanceMatrix>>>()?;
        let pairs = blocks.iter().zip(&shuffled).map(|((bx, _), by)| (bx, by));
        Ok(pooled_statistic(pairs, mode, max_lag)?.statistic)
    })?;

    let p_value = null.p_value_upper(observed.statistic);
    debug!(
        "fast subsampling p-value {:.4} from {} replications over {} blocks of at least {}",
        p_value,
        null.len(),
        plan.num_blocks,
        m
    );

    Ok(PValueResult {
        p_value,
        observed,
        method: PValueMethod::FastSubsampling {
            subsample_size: m,
            num_blocks: plan.num_blocks,
        },
        null_summary: null.summary(),
    })
}
