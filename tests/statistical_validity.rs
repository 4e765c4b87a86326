//! Monte Carlo validity and power checks
//!
//! Rejection rates at alpha = 0.05 are compared against binomial bounds.
//! Every run is seeded so the outcome is fixed for a given build.

use timeseries_independence::{
    CorrelatedAr1, DCorrX, IndependentNoise, PValueOptions, SecureRng, SeriesGenerator,
};

const ALPHA: f64 = 0.05;

fn rejections<G: SeriesGenerator>(
    generator: &G,
    test: &DCorrX,
    options: &PValueOptions,
    n: usize,
    num_sims: usize,
    seed: u64,
) -> usize {
    let mut rng = SecureRng::with_seed(seed);
    (0..num_sims)
        .filter(|_| {
            let (x, y) = generator.simulate(n, &mut rng).unwrap();
            test.p_value(&x, &y, options, &mut rng).unwrap().p_value < ALPHA
        })
        .count()
}

/// Under independence the rejection rate stays within a 1.96-sigma
/// binomial band around alpha.
#[test]
fn test_exact_permutation_validity() {
    let num_sims = 100;
    let test = DCorrX::new("unbiased", 2).unwrap();
    let rejects = rejections(
        &IndependentNoise::default(),
        &test,
        &PValueOptions::exact(100),
        25,
        num_sims,
        20240601,
    );
    let expected = num_sims as f64 * ALPHA;
    let band = 1.96 * num_sims as f64 * ALPHA * (1.0 - ALPHA);
    assert!(
        (rejects as f64 - expected).abs() <= band,
        "{} rejections out of {} (expected {} +/- {})",
        rejects,
        num_sims,
        expected,
        band
    );
}

/// Under the default cross-coupled AR(1) pair the fast engine rejects well
/// above alpha: n = 45, 25 simulations, max_lag = 1.
#[test]
fn test_fast_subsampling_power() {
    let num_sims = 25;
    let test = DCorrX::new("unbiased", 1).unwrap();
    let rejects = rejections(
        &CorrelatedAr1::default(),
        &test,
        &PValueOptions::fast().with_replication_factor(200),
        45,
        num_sims,
        45,
    );
    let threshold = num_sims as f64 * ALPHA + 1.96 * num_sims as f64 * ALPHA * (1.0 - ALPHA);
    assert!(
        rejects as f64 > threshold,
        "{} rejections out of {} (threshold {})",
        rejects,
        num_sims,
        threshold
    );
}

/// The same power property holds across independent simulation streams.
#[test]
#[cfg_attr(not(feature = "long-tests"), ignore)]
fn test_fast_subsampling_power_across_seeds() {
    let num_sims = 25;
    let test = DCorrX::new("unbiased", 1).unwrap();
    let options = PValueOptions::fast().with_replication_factor(200);
    let threshold = num_sims as f64 * ALPHA + 1.96 * num_sims as f64 * ALPHA * (1.0 - ALPHA);
    for seed in 0..10 {
        let rejects = rejections(&CorrelatedAr1::default(), &test, &options, 45, num_sims, seed);
        assert!(rejects as f64 > threshold, "seed {}: {} rejections", seed, rejects);
    }
}

/// The exact engine is at least as powerful as the fast one on the same data.
#[test]
#[cfg_attr(not(feature = "long-tests"), ignore)]
fn test_exact_power_dominates_fast() {
    let num_sims = 40;
    let test = DCorrX::new("unbiased", 1).unwrap();
    let generator = CorrelatedAr1::default();
    let exact = rejections(&generator, &test, &PValueOptions::exact(200), 64, num_sims, 11);
    let fast = rejections(
        &generator,
        &test,
        &PValueOptions::fast().with_replication_factor(200),
        64,
        num_sims,
        11,
    );
    assert!(exact + 2 >= fast, "exact {} vs fast {}", exact, fast);
    assert!(exact as f64 > num_sims as f64 * ALPHA * 2.0);
}

#[test]
#[cfg_attr(not(feature = "long-tests"), ignore)]
fn test_circular_block_validity() {
    use timeseries_independence::PermutationScheme;

    let num_sims = 100;
    let test = DCorrX::new("biased", 2).unwrap();
    let options = PValueOptions::exact(100)
        .with_scheme(PermutationScheme::CircularBlock { block_size: None });
    let rejects = rejections(&IndependentNoise::default(), &test, &options, 36, num_sims, 99);
    let band = 1.96 * num_sims as f64 * ALPHA * (1.0 - ALPHA);
    assert!((rejects as f64 - num_sims as f64 * ALPHA).abs() <= band);
}

#[test]
#[cfg_attr(not(feature = "long-tests"), ignore)]
fn test_fast_subsampling_validity() {
    let num_sims = 100;
    let test = DCorrX::new("unbiased", 1).unwrap();
    let options = PValueOptions::fast().with_replication_factor(100);
    let rejects = rejections(&IndependentNoise::default(), &test, &options, 64, num_sims, 64);
    let band = 1.96 * num_sims as f64 * ALPHA * (1.0 - ALPHA);
    assert!((rejects as f64 - num_sims as f64 * ALPHA).abs() <= band);
}
