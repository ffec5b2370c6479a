//! Chi-square test of independence for conversion tables.

use ablab_core::{chi_square_independence, ConversionObservation};
use serde::{Deserialize, Serialize};

/// Result of a chi-square test on a 2x2 conversion table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChiSquareResult {
    /// Pearson chi-square statistic.
    pub statistic: f64,
    /// Right-tail p-value.
    pub p_value: f64,
    /// Degrees of freedom (1 for two arms).
    pub degrees_of_freedom: u32,
    /// Expected cell frequencies under independence.
    pub expected_frequencies: [[f64; 2]; 2],
    /// Whether `p_value < alpha`.
    pub is_significant: bool,
}

/// Runs the Pearson chi-square test of independence, no continuity
/// correction. A degenerate table (no conversions anywhere, or nothing but
/// conversions) is reported as neutral with p = 1.
#[must_use]
pub fn chi_square_test(obs: &ConversionObservation, alpha: f64) -> ChiSquareResult {
    let outcome = chi_square_independence(obs.contingency_table());

    ChiSquareResult {
        statistic: outcome.statistic,
        p_value: outcome.p_value,
        degrees_of_freedom: outcome.degrees_of_freedom,
        expected_frequencies: outcome.expected,
        is_significant: outcome.p_value < alpha,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_difference_is_significant() {
        let obs = ConversionObservation::new(100, 5000, 150, 5000).unwrap();
        let result = chi_square_test(&obs, 0.05);

        assert!(result.p_value < 0.01, "p-value was {}", result.p_value);
        assert!(result.is_significant);
        assert_eq!(result.degrees_of_freedom, 1);
    }

    #[test]
    fn tiny_difference_is_not_significant() {
        let obs = ConversionObservation::new(50, 5000, 52, 5000).unwrap();
        let result = chi_square_test(&obs, 0.05);

        assert!(result.p_value > 0.5, "p-value was {}", result.p_value);
        assert!(!result.is_significant);
    }

    #[test]
    fn zero_conversions_both_arms_is_neutral() {
        let obs = ConversionObservation::new(0, 1000, 0, 1000).unwrap();
        let result = chi_square_test(&obs, 0.05);

        assert!((result.p_value - 1.0).abs() < f64::EPSILON);
        assert!(!result.is_significant);
    }

    #[test]
    fn respects_alpha() {
        let obs = ConversionObservation::new(100, 5000, 130, 5000).unwrap();
        let loose = chi_square_test(&obs, 0.10);
        let strict = chi_square_test(&obs, 0.001);

        // Same p-value, different significance calls.
        assert!((loose.p_value - strict.p_value).abs() < f64::EPSILON);
        assert!(loose.is_significant != strict.is_significant || loose.p_value < 0.001);
    }
}
