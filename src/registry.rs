//! Name-based selection of independence tests.
//!
//! Tests are exposed through the object-safe [`IndependenceTest`] trait and
//! created by name from a [`TestRegistry`]. The default registry knows
//! `"dcorrx"` (lag-aggregated) and `"dcorr"` (plain distance correlation);
//! further tests can be registered at runtime.

use crate::centering::EstimatorMode;
use crate::config::{PValueOptions, TestConfiguration};
use crate::dcorr::DCorr;
use crate::dcorrx::DCorrX;
use crate::errors::{IndependenceError, IndependenceResult};
use crate::monte_carlo::{permutation_p_value, PermutationScheme};
use crate::results::{PValueResult, StatisticResult};
use crate::series::Series;
use log::{debug, warn};
use rand::RngCore;
use std::collections::BTreeMap;

/// An independence test selectable by name.
pub trait IndependenceTest: Send + Sync {
    /// Registry name of the test.
    fn name(&self) -> &str;

    /// Estimator mode the test runs with.
    fn mode(&self) -> EstimatorMode;

    /// Test statistic with per-lag metadata.
    fn test_statistic(&self, x: &Series, y: &Series) -> IndependenceResult<StatisticResult>;

    /// P-value drawing randomness from `rng`.
    fn p_value(
        &self,
        x: &Series,
        y: &Series,
        options: &PValueOptions,
        rng: &mut dyn RngCore,
    ) -> IndependenceResult<PValueResult>;
}

impl IndependenceTest for DCorrX {
    fn name(&self) -> &str {
        "dcorrx"
    }

    fn mode(&self) -> EstimatorMode {
        DCorrX::mode(self)
    }

    fn test_statistic(&self, x: &Series, y: &Series) -> IndependenceResult<StatisticResult> {
        DCorrX::test_statistic(self, x, y)
    }

    fn p_value(
        &self,
        x: &Series,
        y: &Series,
        options: &PValueOptions,
        rng: &mut dyn RngCore,
    ) -> IndependenceResult<PValueResult> {
        DCorrX::p_value(self, x, y, options, rng)
    }
}

impl IndependenceTest for DCorr {
    fn name(&self) -> &str {
        "dcorr"
    }

    fn mode(&self) -> EstimatorMode {
        DCorr::mode(self)
    }

    fn test_statistic(&self, x: &Series, y: &Series) -> IndependenceResult<StatisticResult> {
        Ok(StatisticResult::from_lags(vec![DCorr::test_statistic(self, x, y)?]))
    }

    /// Full permutation p-value; fast mode and block schemes do not apply.
    fn p_value(
        &self,
        x: &Series,
        y: &Series,
        options: &PValueOptions,
        rng: &mut dyn RngCore,
    ) -> IndependenceResult<PValueResult> {
        options.validate()?;
        if options.is_fast {
            warn!("dcorr has no fast mode; using full permutation");
        }
        DCorr::test_statistic(self, x, y)?;
        permutation_p_value(
            x,
            y,
            self.mode(),
            0,
            options.replication_factor,
            PermutationScheme::Full,
            rng,
        )
    }
}

type TestFactory = Box<dyn Fn(EstimatorMode, usize) -> Box<dyn IndependenceTest> + Send + Sync>;

/// Maps test names to constructors.
pub struct TestRegistry {
    factories: BTreeMap<String, TestFactory>,
}

impl TestRegistry {
    /// Registry with no tests.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(EstimatorMode, usize) -> Box<dyn IndependenceTest> + Send + Sync + 'static,
    {
        if self.factories.insert(name.to_string(), Box::new(factory)).is_some() {
            debug!("replaced registered test '{}'", name);
        }
    }

    /// Instantiate the test registered as `name`.
    ///
    /// # Errors
    /// `ConfigurationError` on `test_name` for unknown names.
    pub fn create(
        &self,
        name: &str,
        mode: EstimatorMode,
        max_lag: usize,
    ) -> IndependenceResult<Box<dyn IndependenceTest>> {
        self.factories
            .get(name)
            .map(|factory| factory(mode, max_lag))
            .ok_or_else(|| {
                IndependenceError::configuration(
                    "test_name",
                    format!(
                        "unknown test '{}', expected one of: {}",
                        name,
                        self.names().join(", ")
                    ),
                )
            })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// True when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("dcorrx", |mode, max_lag| {
            Box::new(DCorrX::from_config(TestConfiguration::with_mode(mode, max_lag)))
        });
        registry.register("dcorr", |mode, _| Box::new(DCorr::new(mode)));
        registry
    }
}

impl std::fmt::Debug for TestRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secure_rng::SecureRng;

    fn sample() -> (Series, Series) {
        let x = Series::univariate(vec![0.1, 0.5, -0.3, 1.2, 0.8, -1.0, 0.4, 2.0]).unwrap();
        let y = Series::univariate(vec![1.1, -0.4, 0.3, 0.2, -0.8, 1.6, 0.0, -1.3]).unwrap();
        (x, y)
    }

    #[test]
    fn test_default_registry_names() {
        let registry = TestRegistry::default();
        assert_eq!(registry.names(), vec!["dcorr", "dcorrx"]);
        assert!(registry.contains("dcorrx"));
    }

    #[test]
    fn test_unknown_name_is_configuration_error() {
        let err = TestRegistry::default()
            .create("hhg", EstimatorMode::Biased, 0)
            .err()
            .unwrap();
        match err {
            IndependenceError::ConfigurationError { parameter, message } => {
                assert_eq!(parameter, "test_name");
                assert!(message.contains("dcorrx"));
            }
            _ => panic!("Expected ConfigurationError"),
        }
    }

    #[test]
    fn test_dcorr_matches_dcorrx_at_lag_zero() {
        let registry = TestRegistry::default();
        let (x, y) = sample();
        let plain = registry.create("dcorr", EstimatorMode::Unbiased, 0).unwrap();
        let lagged = registry.create("dcorrx", EstimatorMode::Unbiased, 0).unwrap();
        assert_eq!(plain.name(), "dcorr");
        assert_eq!(
            plain.test_statistic(&x, &y).unwrap(),
            lagged.test_statistic(&x, &y).unwrap()
        );
    }

    #[test]
    fn test_trait_object_p_value() {
        let registry = TestRegistry::default();
        let (x, y) = sample();
        let test = registry.create("dcorrx", EstimatorMode::Biased, 1).unwrap();
        let mut rng = SecureRng::with_seed(12);
        let result = test
            .p_value(&x, &y, &PValueOptions::exact(20), &mut rng)
            .unwrap();
        assert!(result.p_value > 0.0 && result.p_value <= 1.0);
        assert_eq!(test.mode(), EstimatorMode::Biased);
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = TestRegistry::empty();
        registry.register("lagged", |mode, max_lag| {
            Box::new(DCorrX::from_config(TestConfiguration::with_mode(mode, max_lag)))
        });
        assert_eq!(registry.names(), vec!["lagged"]);
        assert!(registry.create("dcorr", EstimatorMode::Biased, 0).is_err());
    }
}
