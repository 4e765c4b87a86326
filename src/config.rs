//! # Test Configuration
//!
//! Immutable configuration values for the lag-aggregated test and for its
//! p-value engines.
//!
//! Validation happens in two phases. The estimator mode is checked when a
//! [`TestConfiguration`] is built; the lag bound depends on the length of
//! the series being tested and is checked by
//! [`TestConfiguration::validate_for_length`] on every evaluation.

use crate::centering::EstimatorMode;
use crate::errors::{validate_positive, IndependenceResult};
use crate::lag_statistic::validate_max_lag;
use crate::monte_carlo::PermutationScheme;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of Monte Carlo replications.
pub const DEFAULT_REPLICATION_FACTOR: usize = 1000;

/// Estimator mode and lag range of a cross-distance-correlation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TestConfiguration {
    mode: EstimatorMode,
    max_lag: usize,
}

impl TestConfiguration {
    /// Configuration from a mode string.
    ///
    /// # Arguments
    /// * `which_test` - `"biased"` or `"unbiased"`
    /// * `max_lag` - Largest lag evaluated
    ///
    /// # Returns
    /// * `Err` with a message naming `which_test` for any other string
    ///
    /// # Example
    /// ```
    /// use timeseries_independence::TestConfiguration;
    ///
    /// let config = TestConfiguration::new("unbiased", 2).unwrap();
    /// assert!(config.validate_for_length(10).is_ok());
    /// assert!(config.validate_for_length(5).is_err());
    /// assert!(TestConfiguration::new("median", 2).is_err());
    /// ```
    pub fn new(which_test: &str, max_lag: usize) -> IndependenceResult<Self> {
        Ok(Self::with_mode(which_test.parse()?, max_lag))
    }

    /// Configuration from an already-parsed mode.
    pub fn with_mode(mode: EstimatorMode, max_lag: usize) -> Self {
        Self { mode, max_lag }
    }

    /// Estimator mode.
    pub fn mode(&self) -> EstimatorMode {
        self.mode
    }

    /// Largest lag evaluated.
    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    /// Check the lag bound against a series of length `n`.
    pub fn validate_for_length(&self, n: usize) -> IndependenceResult<()> {
        validate_max_lag(self.mode, self.max_lag, n)
    }
}

/// Options controlling p-value estimation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PValueOptions {
    /// Number of null replications
    pub replication_factor: usize,
    /// Use the fast subsampling engine instead of exact permutation
    pub is_fast: bool,
    /// Shortest block length for the fast engine, `floor(n^(2/3))` when `None`
    pub subsample_size: Option<usize>,
    /// Resampling scheme of the exact engine
    pub permutation_scheme: PermutationScheme,
    /// Seed for a reproducible run when no generator is supplied
    pub seed: Option<u64>,
}

impl Default for PValueOptions {
    fn default() -> Self {
        Self {
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            is_fast: false,
            subsample_size: None,
            permutation_scheme: PermutationScheme::Full,
            seed: None,
        }
    }
}

impl PValueOptions {
    /// Exact permutation engine with `replication_factor` replications.
    pub fn exact(replication_factor: usize) -> Self {
        Self {
            replication_factor,
            ..Self::default()
        }
    }

    /// Fast subsampling engine with the default replication count.
    pub fn fast() -> Self {
        Self {
            is_fast: true,
            ..Self::default()
        }
    }

    /// Set the replication count.
    pub fn with_replication_factor(mut self, replication_factor: usize) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    /// Set an explicit subsample size for the fast engine.
    pub fn with_subsample_size(mut self, subsample_size: usize) -> Self {
        self.subsample_size = Some(subsample_size);
        self
    }

    /// Set the exact engine's resampling scheme.
    pub fn with_scheme(mut self, scheme: PermutationScheme) -> Self {
        self.permutation_scheme = scheme;
        self
    }

    /// Fix the seed used when no generator is supplied.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the options that do not depend on the data.
    pub fn validate(&self) -> IndependenceResult<()> {
        validate_positive(self.replication_factor, "replication_factor")?;
        if let Some(m) = self.subsample_size {
            validate_positive(m, "subsample_size")?;
        }
        Ok(())
    }
}
