//! Cross-distance-correlation independence test for time series.
//!
//! [`DCorrX`] owns an immutable [`TestConfiguration`] and dispatches to the
//! lag-aggregated statistic and to either p-value engine. An instance keeps
//! no state between calls, so it can be reused across series of different
//! lengths; the lag bound is checked against each input.
//!
//! ```
//! use timeseries_independence::{DCorrX, PValueOptions, Series};
//!
//! let x = Series::univariate((0..40).map(|t| (t as f64 * 0.3).sin()).collect()).unwrap();
//! let y = Series::univariate((0..40).map(|t| (t as f64 * 0.3 + 0.3).sin()).collect()).unwrap();
//!
//! let test = DCorrX::new("unbiased", 2).unwrap();
//! let stat = test.test_statistic(&x, &y).unwrap();
//! assert!(stat.optimal_lag <= 2);
//!
//! let result = test
//!     .p_value_with_options(&x, &y, &PValueOptions::exact(99).with_seed(7))
//!     .unwrap();
//! assert!(result.p_value > 0.0 && result.p_value <= 1.0);
//! ```

use crate::centering::EstimatorMode;
use crate::config::{PValueOptions, TestConfiguration};
use crate::errors::IndependenceResult;
use crate::lag_statistic::lag_statistic;
use crate::monte_carlo::permutation_p_value;
use crate::results::{PValueResult, StatisticResult};
use crate::secure_rng::SecureRng;
use crate::series::Series;
use crate::subsampling::fast_p_value;
use rand::Rng;

/// Lag-aggregated distance-correlation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DCorrX {
    config: TestConfiguration,
}

impl DCorrX {
    /// Build a test from a mode string and a maximum lag.
    ///
    /// # Errors
    /// `ConfigurationError` naming `which_test` unless it is `"biased"` or
    /// `"unbiased"`.
    pub fn new(which_test: &str, max_lag: usize) -> IndependenceResult<Self> {
        Ok(Self::from_config(TestConfiguration::new(which_test, max_lag)?))
    }

    /// Build a test from a validated configuration.
    pub fn from_config(config: TestConfiguration) -> Self {
        Self { config }
    }

    /// Configured mode string, `"biased"` or `"unbiased"`.
    pub fn get_name(&self) -> &'static str {
        self.config.mode().as_str()
    }

    /// Estimator mode.
    pub fn mode(&self) -> EstimatorMode {
        self.config.mode()
    }

    /// Largest lag evaluated.
    pub fn max_lag(&self) -> usize {
        self.config.max_lag()
    }

    /// Largest per-lag statistic over lags `0..=max_lag`.
    ///
    /// # Errors
    /// * `ConfigurationError` when `max_lag` is too large for `x.len()`
    /// * `DimensionError` when `x` and `y` differ in length
    pub fn test_statistic(&self, x: &Series, y: &Series) -> IndependenceResult<StatisticResult> {
        lag_statistic(x, y, self.config.mode(), self.config.max_lag())
    }

    /// P-value using the caller's random generator.
    ///
    /// `options.seed` is ignored here; the generator alone determines the
    /// null distribution.
    pub fn p_value<R: Rng + ?Sized>(
        &self,
        x: &Series,
        y: &Series,
        options: &PValueOptions,
        rng: &mut R,
    ) -> IndependenceResult<PValueResult> {
        options.validate()?;
        self.config.validate_for_length(x.len())?;

        let (mode, max_lag) = (self.config.mode(), self.config.max_lag());
        if options.is_fast {
            fast_p_value(
                x,
                y,
                mode,
                max_lag,
                options.replication_factor,
                options.subsample_size,
                rng,
            )
        } else {
            permutation_p_value(
                x,
                y,
                mode,
                max_lag,
                options.replication_factor,
                options.permutation_scheme,
                rng,
            )
        }
    }

    /// P-value with a generator seeded from `options.seed`, or from OS
    /// entropy when no seed is set.
    pub fn p_value_with_options(
        &self,
        x: &Series,
        y: &Series,
        options: &PValueOptions,
    ) -> IndependenceResult<PValueResult> {
        let mut rng = match options.seed {
            Some(seed) => SecureRng::with_seed(seed),
            None => SecureRng::new(),
        };
        self.p_value(x, y, options, &mut rng)
    }
}
