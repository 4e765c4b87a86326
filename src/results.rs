//! # Test Results
//!
//! Value types returned by statistic and p-value evaluation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lag-aggregated statistic and its per-lag breakdown.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatisticResult {
    /// Reported test statistic: the largest per-lag statistic
    pub statistic: f64,
    /// Lag attaining `statistic` (smallest such lag on ties)
    pub optimal_lag: usize,
    /// Statistic at each lag `0..=max_lag`
    pub dependence_by_lag: Vec<f64>,
}

impl StatisticResult {
    /// Aggregate a per-lag vector by taking its maximum.
    ///
    /// Lags are scanned upward and only a strictly larger value replaces the
    /// current best, so the smallest lag wins ties. An empty vector yields a
    /// statistic of 0 at lag 0.
    pub fn from_lags(dependence_by_lag: Vec<f64>) -> Self {
        let mut optimal_lag = 0;
        let mut statistic = dependence_by_lag.first().copied().unwrap_or(0.0);
        for (lag, &value) in dependence_by_lag.iter().enumerate().skip(1) {
            if value > statistic {
                statistic = value;
                optimal_lag = lag;
            }
        }
        Self {
            statistic,
            optimal_lag,
            dependence_by_lag,
        }
    }

    /// Largest lag that was evaluated.
    pub fn max_lag(&self) -> usize {
        self.dependence_by_lag.len().saturating_sub(1)
    }
}

/// How a p-value was produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PValueMethod {
    /// Uniform permutations of Y's rows over the full sample
    Permutation,
    /// Circular block resampling of Y's rows
    CircularBlock {
        /// Block length used
        block_size: usize,
    },
    /// Block-averaged statistic with within-block permutations
    FastSubsampling {
        /// Length of each block
        subsample_size: usize,
        /// Number of complete blocks used
        num_blocks: usize,
    },
}

/// Summary of the Monte Carlo null distribution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NullSummary {
    /// Number of null statistics retained
    pub replications: usize,
    /// Mean of the null statistics
    pub mean: f64,
    /// Sample standard deviation of the null statistics
    pub std_dev: f64,
    /// Upper 5% critical value of the null distribution
    pub critical_value: f64,
}

/// P-value together with the observed statistic and null summary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PValueResult {
    /// Smoothed empirical p-value in (0, 1]
    pub p_value: f64,
    /// Observed statistic the null distribution was compared against
    pub observed: StatisticResult,
    /// Engine that produced the p-value
    pub method: PValueMethod,
    /// Null distribution summary
    pub null_summary: NullSummary,
}

impl PValueResult {
    /// True when the p-value falls below `alpha`.
    pub fn reject_null(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}
