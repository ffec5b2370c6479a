//! Fisher's exact test for small conversion samples.

use ablab_core::ConversionObservation;
use serde::{Deserialize, Serialize};
use statrs::function::gamma::ln_gamma;

/// Fisher's exact test only joins the panel below this per-arm sample size;
/// above it the asymptotic tests are reliable and enumeration buys nothing.
pub const FISHER_MAX_ARM_SIZE: u64 = 1000;

/// Relative slack when comparing table probabilities, absorbing ln-gamma
/// round-off so the observed table always counts toward its own p-value.
const PMF_SLACK: f64 = 1e-7;

/// Result of a two-sided Fisher exact test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FisherResult {
    /// Sample odds ratio `ad / bc`; infinite when `bc = 0`.
    pub odds_ratio: f64,
    /// Two-sided exact p-value.
    pub p_value: f64,
    /// Whether `p_value < alpha`.
    pub is_significant: bool,
}

/// Two-sided Fisher exact test on the 2x2 conversion table.
///
/// With the margins fixed, the top-left cell follows a hypergeometric
/// distribution; the two-sided p-value sums the probability of every table
/// at most as likely as the observed one.
#[must_use]
pub fn fisher_exact_test(obs: &ConversionObservation, alpha: f64) -> FisherResult {
    let a = obs.control_conversions;
    let b = obs.control_total - obs.control_conversions;
    let c = obs.variant_conversions;
    let d = obs.variant_total - obs.variant_conversions;

    let odds_ratio = if b == 0 || c == 0 {
        if a == 0 || d == 0 {
            f64::NAN
        } else {
            f64::INFINITY
        }
    } else {
        (a as f64 * d as f64) / (b as f64 * c as f64)
    };

    let n = a + b + c + d;
    let row1 = a + b;
    let col1 = a + c;

    let lo = row1.saturating_sub(n - col1);
    let hi = row1.min(col1);

    let ln_observed = ln_hypergeom_pmf(a, n, row1, col1);
    let threshold = ln_observed + PMF_SLACK;

    let mut p_value = 0.0;
    for k in lo..=hi {
        let ln_p = ln_hypergeom_pmf(k, n, row1, col1);
        if ln_p <= threshold {
            p_value += ln_p.exp();
        }
    }

    let p_value = p_value.min(1.0);

    FisherResult {
        odds_ratio,
        p_value,
        is_significant: p_value < alpha,
    }
}

/// Log probability of drawing `k` marked items when `row1` items are drawn
/// without replacement from `n` items of which `col1` are marked.
fn ln_hypergeom_pmf(k: u64, n: u64, row1: u64, col1: u64) -> f64 {
    ln_choose(col1, k) + ln_choose(n - col1, row1 - k) - ln_choose(n, row1)
}

fn ln_choose(n: u64, k: u64) -> f64 {
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_two_sided_p_value() {
        // Table [[8, 2], [1, 5]]: odds ratio 20, two-sided p = 0.034965...
        let obs = ConversionObservation::new(8, 10, 1, 6).unwrap();
        let result = fisher_exact_test(&obs, 0.05);

        assert!((result.odds_ratio - 20.0).abs() < 1e-9);
        assert!(
            (result.p_value - 0.034_965_034).abs() < 1e-6,
            "p-value was {}",
            result.p_value
        );
        assert!(result.is_significant);
    }

    #[test]
    fn balanced_table_is_not_significant() {
        let obs = ConversionObservation::new(5, 50, 5, 50).unwrap();
        let result = fisher_exact_test(&obs, 0.05);

        assert!((result.p_value - 1.0).abs() < 1e-9, "p was {}", result.p_value);
        assert!(!result.is_significant);
        assert!((result.odds_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_cell_gives_infinite_odds_ratio() {
        let obs = ConversionObservation::new(10, 10, 2, 10).unwrap();
        let result = fisher_exact_test(&obs, 0.05);

        assert!(result.odds_ratio.is_infinite());
        assert!(result.p_value <= 1.0 && result.p_value >= 0.0);
    }

    #[test]
    fn no_conversions_anywhere_is_neutral() {
        let obs = ConversionObservation::new(0, 20, 0, 20).unwrap();
        let result = fisher_exact_test(&obs, 0.05);

        // Only one table is possible, so it carries all the mass.
        assert!((result.p_value - 1.0).abs() < 1e-9);
        assert!(!result.is_significant);
    }

    #[test]
    fn p_value_never_exceeds_one() {
        let obs = ConversionObservation::new(7, 35, 8, 40).unwrap();
        let result = fisher_exact_test(&obs, 0.05);
        assert!(result.p_value <= 1.0);
    }

    #[test]
    fn strong_small_sample_effect_is_detected() {
        let obs = ConversionObservation::new(2, 100, 18, 100).unwrap();
        let result = fisher_exact_test(&obs, 0.05);

        assert!(result.p_value < 0.01, "p-value was {}", result.p_value);
        assert!(result.is_significant);
    }
}
