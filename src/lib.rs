//! # Time Series Independence Testing
//!
//! Distance-correlation independence tests for temporally ordered,
//! possibly multivariate, series.
//!
//! The central test is [`DCorrX`]: the distance correlation of `X` and a
//! lag-shifted `Y` is computed for every lag up to a configured maximum, and
//! the largest value is the test statistic. P-values come from a Monte Carlo
//! null distribution, built either by exact permutation of Y's rows or by a
//! faster block-subsampling approximation suited to long series.
//!
//! ## Quick Start
//!
//! ```rust
//! use timeseries_independence::{
//!     CorrelatedAr1, DCorrX, PValueOptions, SecureRng, SeriesGenerator,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut rng = SecureRng::with_seed(42);
//!     let (x, y) = CorrelatedAr1::new(0.8).simulate(100, &mut rng)?;
//!
//!     let test = DCorrX::new("unbiased", 2)?;
//!     let stat = test.test_statistic(&x, &y)?;
//!     println!("statistic {:.4} at lag {}", stat.statistic, stat.optimal_lag);
//!
//!     let result = test.p_value(&x, &y, &PValueOptions::fast().with_replication_factor(200), &mut rng)?;
//!     println!("fast p-value {:.4}", result.p_value);
//!     Ok(())
//! }
//! ```
//!
//! ## Estimators
//!
//! - **Biased**: double-centered distance matrices (V-statistic)
//! - **Unbiased**: U-centered matrices (Székely & Rizzo, 2014), which need at
//!   least four aligned samples at every lag
//!
//! ## Randomness
//!
//! Resampling engines take any [`rand::Rng`]. [`SecureRng`] wraps ChaCha20
//! and can be seeded for reproducible p-values. With the `parallel` feature
//! the null distribution is computed with rayon and matches the sequential
//! result for the same seed.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod errors;
pub mod results;
pub mod secure_rng;
pub mod series;

// Statistic pipeline
pub mod centering;
pub mod dcorr;
pub mod distance;
pub mod lag_statistic;

// Resampling engines
pub mod block_size;
pub mod monte_carlo;
pub mod subsampling;

// Test surface
pub mod config;
pub mod dcorrx;
pub mod generators;
pub mod registry;

pub use centering::{center, CenteredMatrix, EstimatorMode};
pub use config::{PValueOptions, TestConfiguration, DEFAULT_REPLICATION_FACTOR};
pub use dcorr::{distance_correlation, distance_covariance, DCorr, DistanceMoments};
pub use dcorrx::DCorrX;
pub use distance::DistanceMatrix;
pub use errors::{ErrorKind, IndependenceError, IndependenceResult};
pub use generators::{CorrelatedAr1, IndependentNoise, SeriesGenerator};
pub use lag_statistic::{lag_statistic, max_lag_bound, validate_max_lag};
pub use monte_carlo::{permutation_p_value, NullDistribution, PermutationScheme};
pub use registry::{IndependenceTest, TestRegistry};
pub use results::{NullSummary, PValueMethod, PValueResult, StatisticResult};
pub use secure_rng::{mix_seed, SecureRng};
pub use series::Series;
pub use subsampling::fast_p_value;
