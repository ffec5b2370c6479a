//! Experiment sizing via the pooled two-proportion sample-size formula.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::stats::normal_quantile;

/// Default two-sided significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;
/// Default target statistical power.
pub const DEFAULT_POWER: f64 = 0.80;

/// Planned design for a two-arm conversion experiment.
///
/// `minimum_detectable_effect` is relative: 0.10 plans for a variant rate of
/// `baseline_rate * 1.10`.
///
/// # Examples
/// ```
/// use ablab_core::ExperimentDesign;
///
/// let design = ExperimentDesign::new(0.02, 0.10);
/// let n = design.required_sample_size().unwrap();
/// assert!(n > 70_000 && n < 90_000);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExperimentDesign {
    /// Current conversion rate of the control experience.
    pub baseline_rate: f64,
    /// Smallest relative lift the test should detect.
    pub minimum_detectable_effect: f64,
    /// Two-sided significance level.
    pub alpha: f64,
    /// Target statistical power.
    pub power: f64,
}

impl ExperimentDesign {
    /// Creates a design with the conventional alpha 0.05 and power 0.80.
    #[must_use]
    pub fn new(baseline_rate: f64, minimum_detectable_effect: f64) -> Self {
        Self {
            baseline_rate,
            minimum_detectable_effect,
            alpha: DEFAULT_ALPHA,
            power: DEFAULT_POWER,
        }
    }

    /// Sets the significance level.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the target power.
    #[must_use]
    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    /// Variant rate implied by the baseline and the relative MDE.
    #[must_use]
    pub fn variant_rate(&self) -> f64 {
        self.baseline_rate * (1.0 + self.minimum_detectable_effect)
    }

    /// Validates every design parameter.
    ///
    /// # Errors
    /// Returns `InvalidParameter` for a baseline outside (0, 1), a
    /// non-positive MDE, an MDE that pushes the variant rate to 1 or above,
    /// or alpha/power outside (0, 1).
    pub fn validate(&self) -> Result<(), StatsError> {
        if !(self.baseline_rate > 0.0 && self.baseline_rate < 1.0) {
            return Err(StatsError::invalid(
                "baseline_rate",
                format!("must be in (0, 1), got {}", self.baseline_rate),
            ));
        }
        if !(self.minimum_detectable_effect > 0.0) {
            return Err(StatsError::invalid(
                "minimum_detectable_effect",
                format!("must be positive, got {}", self.minimum_detectable_effect),
            ));
        }
        if self.variant_rate() >= 1.0 {
            return Err(StatsError::invalid(
                "minimum_detectable_effect",
                format!(
                    "lifts the variant rate to {}, outside (0, 1)",
                    self.variant_rate()
                ),
            ));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(StatsError::invalid(
                "alpha",
                format!("must be in (0, 1), got {}", self.alpha),
            ));
        }
        if !(self.power > 0.0 && self.power < 1.0) {
            return Err(StatsError::invalid(
                "power",
                format!("must be in (0, 1), got {}", self.power),
            ));
        }
        Ok(())
    }

    /// Required per-arm sample size for a two-sided test at `alpha` to reach
    /// `power` against the designed effect.
    ///
    /// Uses the pooled-variance formula
    /// `n = ceil(2 * p(1-p) * (z_alpha + z_beta)^2 / (p1 - p2)^2)`
    /// with `p` the midpoint of the two rates.
    ///
    /// # Errors
    /// Returns `InvalidParameter` when [`validate`](Self::validate) does.
    pub fn required_sample_size(&self) -> Result<u64, StatsError> {
        self.validate()?;

        let z_alpha = normal_quantile(1.0 - self.alpha / 2.0)?;
        let z_beta = normal_quantile(self.power)?;

        let p1 = self.baseline_rate;
        let p2 = self.variant_rate();
        let p_pooled = (p1 + p2) / 2.0;

        let n = 2.0 * p_pooled * (1.0 - p_pooled) * (z_alpha + z_beta).powi(2)
            / (p1 - p2).powi(2);

        Ok((n.ceil() as u64).max(1))
    }

    /// Days needed to fill both arms at the given average daily traffic.
    ///
    /// # Errors
    /// Returns `InvalidParameter` for non-positive traffic or an invalid
    /// design.
    pub fn test_duration_days(&self, avg_daily_users: f64) -> Result<u64, StatsError> {
        if !(avg_daily_users > 0.0) {
            return Err(StatsError::invalid(
                "avg_daily_users",
                format!("must be positive, got {avg_daily_users}"),
            ));
        }
        let n = self.required_sample_size()?;
        Ok(((2 * n) as f64 / avg_daily_users).ceil() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================
    // required_sample_size Tests
    // ============================================

    #[test]
    fn sample_size_known_value() {
        // 2% baseline, +10% relative: p2 = 0.022, n ~= 80,700 per arm.
        let n = ExperimentDesign::new(0.02, 0.10)
            .required_sample_size()
            .unwrap();
        assert!(n > 79_000 && n < 82_000, "n was {n}");
    }

    #[test]
    fn sample_size_decreases_with_larger_mde() {
        let small = ExperimentDesign::new(0.05, 0.05)
            .required_sample_size()
            .unwrap();
        let medium = ExperimentDesign::new(0.05, 0.10)
            .required_sample_size()
            .unwrap();
        let large = ExperimentDesign::new(0.05, 0.30)
            .required_sample_size()
            .unwrap();

        assert!(small > medium, "small={small} medium={medium}");
        assert!(medium > large, "medium={medium} large={large}");
    }

    #[test]
    fn sample_size_increases_with_power() {
        let p70 = ExperimentDesign::new(0.03, 0.10)
            .with_power(0.70)
            .required_sample_size()
            .unwrap();
        let p80 = ExperimentDesign::new(0.03, 0.10)
            .with_power(0.80)
            .required_sample_size()
            .unwrap();
        let p90 = ExperimentDesign::new(0.03, 0.10)
            .with_power(0.90)
            .required_sample_size()
            .unwrap();

        assert!(p70 < p80, "p70={p70} p80={p80}");
        assert!(p80 < p90, "p80={p80} p90={p90}");
    }

    #[test]
    fn sample_size_increases_as_alpha_shrinks() {
        let a10 = ExperimentDesign::new(0.03, 0.10)
            .with_alpha(0.10)
            .required_sample_size()
            .unwrap();
        let a05 = ExperimentDesign::new(0.03, 0.10)
            .with_alpha(0.05)
            .required_sample_size()
            .unwrap();
        let a01 = ExperimentDesign::new(0.03, 0.10)
            .with_alpha(0.01)
            .required_sample_size()
            .unwrap();

        assert!(a10 < a05, "a10={a10} a05={a05}");
        assert!(a05 < a01, "a05={a05} a01={a01}");
    }

    #[test]
    fn sample_size_is_at_least_one() {
        // Huge effect on a mid-range baseline still reports n >= 1.
        let n = ExperimentDesign::new(0.30, 0.90)
            .required_sample_size()
            .unwrap();
        assert!(n >= 1);
    }

    // ============================================
    // Validation Tests
    // ============================================

    #[test]
    fn rejects_baseline_outside_unit_interval() {
        assert!(ExperimentDesign::new(0.0, 0.10)
            .required_sample_size()
            .is_err());
        assert!(ExperimentDesign::new(1.0, 0.10)
            .required_sample_size()
            .is_err());
        assert!(ExperimentDesign::new(-0.1, 0.10)
            .required_sample_size()
            .is_err());
    }

    #[test]
    fn rejects_zero_mde() {
        // With p1 == p2 the formula degenerates to infinity.
        let err = ExperimentDesign::new(0.02, 0.0)
            .required_sample_size()
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::InvalidParameter {
                name: "minimum_detectable_effect",
                ..
            }
        ));
    }

    #[test]
    fn rejects_mde_pushing_variant_past_one() {
        assert!(ExperimentDesign::new(0.60, 0.80)
            .required_sample_size()
            .is_err());
    }

    #[test]
    fn rejects_bad_alpha_and_power() {
        assert!(ExperimentDesign::new(0.02, 0.10)
            .with_alpha(0.0)
            .required_sample_size()
            .is_err());
        assert!(ExperimentDesign::new(0.02, 0.10)
            .with_alpha(1.0)
            .required_sample_size()
            .is_err());
        assert!(ExperimentDesign::new(0.02, 0.10)
            .with_power(0.0)
            .required_sample_size()
            .is_err());
        assert!(ExperimentDesign::new(0.02, 0.10)
            .with_power(1.0)
            .required_sample_size()
            .is_err());
    }

    // ============================================
    // test_duration_days Tests
    // ============================================

    #[test]
    fn duration_covers_both_arms() {
        let design = ExperimentDesign::new(0.02, 0.10);
        let n = design.required_sample_size().unwrap();
        let days = design.test_duration_days(10_000.0).unwrap();

        let expected = ((2 * n) as f64 / 10_000.0).ceil() as u64;
        assert_eq!(days, expected);
    }

    #[test]
    fn duration_rejects_zero_traffic() {
        let design = ExperimentDesign::new(0.02, 0.10);
        assert!(design.test_duration_days(0.0).is_err());
    }
}
