//! Post-hoc statistical power for an observed two-proportion comparison.

use ablab_core::stats::normal_cdf;

/// Achieved power of a two-sided two-proportion z-test, given the observed
/// rates and the per-arm sample size actually collected.
///
/// Uses the standard normal approximation: under the alternative centered on
/// the observed effect, power is the probability that |z| clears the
/// `z_alpha` critical value. Returns 0.0 when `sample_size` is zero.
#[must_use]
pub fn posthoc_power(control_rate: f64, variant_rate: f64, sample_size: u64, z_alpha: f64) -> f64 {
    if sample_size == 0 {
        return 0.0;
    }
    let n = sample_size as f64;

    let pooled = (control_rate + variant_rate) / 2.0;
    let se_null = (2.0 * pooled * (1.0 - pooled) / n).sqrt();
    let se_alt = (control_rate * (1.0 - control_rate) / n
        + variant_rate * (1.0 - variant_rate) / n)
        .sqrt();

    let effect = (variant_rate - control_rate).abs();
    if se_alt == 0.0 {
        // Degenerate rates (both 0 or both 1) leave no sampling noise.
        return normal_cdf(0.0);
    }

    let shift = (effect - z_alpha * se_null) / se_alt;
    normal_cdf(shift).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const Z_05: f64 = 1.959_963_984_540_054;

    #[test]
    fn large_effect_and_sample_is_well_powered() {
        let power = posthoc_power(0.02, 0.03, 50_000, Z_05);
        assert!(power > 0.99, "power was {power}");
    }

    #[test]
    fn tiny_sample_is_underpowered() {
        let power = posthoc_power(0.02, 0.022, 500, Z_05);
        assert!(power < 0.2, "power was {power}");
    }

    #[test]
    fn power_grows_with_sample_size() {
        let small = posthoc_power(0.02, 0.024, 5_000, Z_05);
        let large = posthoc_power(0.02, 0.024, 50_000, Z_05);
        assert!(large > small);
    }

    #[test]
    fn zero_effect_gives_alpha_like_power() {
        let power = posthoc_power(0.02, 0.02, 10_000, Z_05);
        assert!(power < 0.05, "power was {power}");
    }

    #[test]
    fn zero_sample_size_is_zero_power() {
        assert_eq!(posthoc_power(0.02, 0.03, 0, Z_05), 0.0);
    }

    #[test]
    fn degenerate_rates_return_half() {
        let power = posthoc_power(0.0, 0.0, 1_000, Z_05);
        assert!((power - 0.5).abs() < 1e-12);
    }
}
