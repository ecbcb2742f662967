//! Distribution checks for sampled output.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic RNG for a test.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Pearson's chi-square statistic of `observed` counts against `weights`.
///
/// Weights are normalised; categories with zero weight are skipped (they must
/// have zero observations for a meaningful result).
pub fn chi_square(observed: &[u64], weights: &[f64]) -> f64 {
    assert_eq!(observed.len(), weights.len(), "one weight per category");
    let total: u64 = observed.iter().sum();
    let weight_sum: f64 = weights.iter().sum();

    observed
        .iter()
        .zip(weights)
        .filter(|(_, w)| **w > 0.0)
        .map(|(o, w)| {
            let expected = total as f64 * w / weight_sum;
            let diff = *o as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

/// Approximate upper critical value of chi-square with `df` degrees of
/// freedom at significance 0.001 (Wilson-Hilferty).
pub fn chi_square_critical(df: usize) -> f64 {
    const Z_999: f64 = 3.090;
    let k = df.max(1) as f64;
    let h = 2.0 / (9.0 * k);
    k * (1.0 - h + Z_999 * h.sqrt()).powi(3)
}

/// Whether `observed` is consistent with `weights` at the 0.001 level.
pub fn fits_weights(observed: &[u64], weights: &[f64]) -> bool {
    let categories = weights.iter().filter(|w| **w > 0.0).count();
    let df = categories.saturating_sub(1);
    chi_square(observed, weights) < chi_square_critical(df)
}
