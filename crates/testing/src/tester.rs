//! Full test panel: runs every applicable sub-test on one observation and
//! reduces the results to a single verdict.

use ablab_core::stats::normal_quantile;
use ablab_core::{ConversionObservation, ExperimentDesign, StatsError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bayesian::{bayesian_test, BayesianResult, DEFAULT_BAYES_SAMPLES};
use crate::chi_square::{chi_square_test, ChiSquareResult};
use crate::fisher::{fisher_exact_test, FisherResult, FISHER_MAX_ARM_SIZE};
use crate::power::posthoc_power;
use crate::verdict::{decide, Verdict, VerdictInputs};
use crate::z_test::{z_test, ZTestResult};

/// Runs the complete panel of conversion tests.
///
/// Construct once per analysis policy (alpha, power target), then call
/// [`comprehensive_test`](Self::comprehensive_test) per observation.
#[derive(Debug, Clone)]
pub struct ConversionTester {
    alpha: f64,
    power: f64,
    z_alpha: f64,
    bayes_samples: usize,
    seed: Option<u64>,
}

impl ConversionTester {
    /// Creates a tester with the given significance level and power target.
    pub fn new(alpha: f64, power: f64) -> Result<Self, StatsError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(StatsError::invalid(
                "alpha",
                format!("must be in (0, 1), got {alpha}"),
            ));
        }
        if !(power > 0.0 && power < 1.0) {
            return Err(StatsError::invalid(
                "power",
                format!("must be in (0, 1), got {power}"),
            ));
        }
        let z_alpha = normal_quantile(1.0 - alpha / 2.0)?;
        Ok(Self {
            alpha,
            power,
            z_alpha,
            bayes_samples: DEFAULT_BAYES_SAMPLES,
            seed: None,
        })
    }

    /// Fixes the RNG seed for the Bayesian sampler, making reports
    /// bit-reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Overrides the posterior sample count.
    #[must_use]
    pub fn with_bayes_samples(mut self, n_samples: usize) -> Self {
        self.bayes_samples = n_samples;
        self
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Runs every applicable sub-test and reduces them to a verdict.
    ///
    /// Fisher's exact test joins the panel only when the smaller arm is
    /// below [`FISHER_MAX_ARM_SIZE`].
    pub fn comprehensive_test(
        &self,
        obs: &ConversionObservation,
    ) -> Result<TestReport, StatsError> {
        let chi_square = chi_square_test(obs, self.alpha);
        let z = z_test(obs, self.alpha, self.z_alpha);

        let fisher_exact = if obs.smaller_arm() < FISHER_MAX_ARM_SIZE {
            Some(fisher_exact_test(obs, self.alpha))
        } else {
            None
        };

        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let bayesian = bayesian_test(obs, self.bayes_samples, &mut rng)?;

        let statistical_power = posthoc_power(
            obs.control_rate(),
            obs.variant_rate(),
            obs.smaller_arm(),
            self.z_alpha,
        );

        let min_sample_size_mde_10pct = min_sample_size(obs, self.alpha, self.power);

        let mut significant_tests = Vec::new();
        if chi_square.is_significant {
            significant_tests.push("chi_square".to_string());
        }
        if z.is_significant {
            significant_tests.push("z_test".to_string());
        }
        if let Some(ref fisher) = fisher_exact {
            if fisher.is_significant {
                significant_tests.push("fisher_exact".to_string());
            }
        }
        if bayesian.is_significant {
            significant_tests.push("bayesian".to_string());
        }

        let total_tests = if fisher_exact.is_some() { 4 } else { 3 };

        debug!(
            n_significant = significant_tests.len(),
            prob = bayesian.prob_variant_beats_control,
            power = statistical_power,
            "test panel complete"
        );

        let verdict = decide(VerdictInputs {
            significant_tests,
            prob_variant_beats_control: bayesian.prob_variant_beats_control,
            statistical_power,
            min_sample_size: min_sample_size_mde_10pct,
            total_tests,
        });

        Ok(TestReport {
            observation: *obs,
            chi_square,
            z_test: z,
            fisher_exact,
            bayesian,
            statistical_power,
            min_sample_size_mde_10pct,
            verdict,
        })
    }
}

/// Everything the panel produced for one observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    pub observation: ConversionObservation,
    pub chi_square: ChiSquareResult,
    pub z_test: ZTestResult,
    pub fisher_exact: Option<FisherResult>,
    pub bayesian: BayesianResult,
    pub statistical_power: f64,
    /// Per-group sample size needed to detect a 10% relative lift at the
    /// observed control rate; `None` when the rate admits no such design.
    pub min_sample_size_mde_10pct: Option<u64>,
    pub verdict: Verdict,
}

fn min_sample_size(obs: &ConversionObservation, alpha: f64, power: f64) -> Option<u64> {
    ExperimentDesign::new(obs.control_rate(), 0.10)
        .with_alpha(alpha)
        .with_power(power)
        .required_sample_size()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::{Confidence, Decision};

    fn tester() -> ConversionTester {
        ConversionTester::new(0.05, 0.80).unwrap().with_seed(7)
    }

    // ========================================================================
    // Panel composition
    // ========================================================================

    #[test]
    fn fisher_joins_the_panel_only_for_small_arms() {
        let small = ConversionObservation::new(8, 100, 15, 100).unwrap();
        let report = tester().comprehensive_test(&small).unwrap();
        assert!(report.fisher_exact.is_some());
        assert_eq!(report.verdict.total_tests, 4);

        let large = ConversionObservation::new(100, 5000, 150, 5000).unwrap();
        let report = tester().comprehensive_test(&large).unwrap();
        assert!(report.fisher_exact.is_none());
        assert_eq!(report.verdict.total_tests, 3);
    }

    // ========================================================================
    // Known scenarios
    // ========================================================================

    #[test]
    fn clear_winner_scenario_is_crowned_with_high_confidence() {
        // 2.0% vs 3.0% on 5000 per arm.
        let obs = ConversionObservation::new(100, 5000, 150, 5000).unwrap();
        let report = tester().comprehensive_test(&obs).unwrap();

        assert!(report.z_test.is_significant);
        assert!(report.chi_square.p_value < 0.01);
        assert!(report.bayesian.prob_variant_beats_control > 0.99);
        assert_eq!(report.verdict.decision, Decision::WinnerVariant);
        assert_eq!(report.verdict.confidence, Confidence::High);
    }

    #[test]
    fn near_identical_arms_are_not_called_a_winner() {
        // 1.0% vs 1.04% on 5000 per arm.
        let obs = ConversionObservation::new(50, 5000, 52, 5000).unwrap();
        let report = tester().comprehensive_test(&obs).unwrap();

        assert!(!report.chi_square.is_significant);
        assert!(!report.z_test.is_significant);
        assert!((report.bayesian.prob_variant_beats_control - 0.5).abs() < 0.1);
        assert!(matches!(
            report.verdict.decision,
            Decision::Inconclusive | Decision::Underpowered
        ));
    }

    #[test]
    fn reversed_arms_crown_the_control() {
        let obs = ConversionObservation::new(150, 5000, 100, 5000).unwrap();
        let report = tester().comprehensive_test(&obs).unwrap();

        assert!(report.bayesian.prob_variant_beats_control < 0.01);
        assert_eq!(report.verdict.decision, Decision::WinnerControl);
    }

    #[test]
    fn z_test_and_chi_square_agree_on_large_samples() {
        // Without continuity correction the two tests are equivalent
        // (z^2 = chi^2), so their significance calls must match.
        let cases = [
            (100u64, 5000u64, 150u64, 5000u64),
            (50, 5000, 52, 5000),
            (200, 10_000, 230, 10_000),
            (40, 2000, 80, 2000),
            (500, 20_000, 510, 20_000),
        ];
        for (cc, ct, vc, vt) in cases {
            let obs = ConversionObservation::new(cc, ct, vc, vt).unwrap();
            let report = tester().comprehensive_test(&obs).unwrap();
            assert_eq!(
                report.chi_square.is_significant, report.z_test.is_significant,
                "disagreement for {cc}/{ct} vs {vc}/{vt}"
            );
        }
    }

    // ========================================================================
    // Reproducibility
    // ========================================================================

    #[test]
    fn seeded_reports_are_bit_identical() {
        let obs = ConversionObservation::new(40, 900, 55, 900).unwrap();
        let a = tester().comprehensive_test(&obs).unwrap();
        let b = tester().comprehensive_test(&obs).unwrap();

        assert_eq!(
            a.bayesian.prob_variant_beats_control,
            b.bayesian.prob_variant_beats_control
        );
        assert_eq!(a.verdict.decision, b.verdict.decision);
        assert_eq!(a.verdict.recommendation, b.verdict.recommendation);
    }

    // ========================================================================
    // Construction and edge cases
    // ========================================================================

    #[test]
    fn rejects_out_of_range_alpha_and_power() {
        assert!(ConversionTester::new(0.0, 0.8).is_err());
        assert!(ConversionTester::new(1.0, 0.8).is_err());
        assert!(ConversionTester::new(0.05, 0.0).is_err());
        assert!(ConversionTester::new(0.05, 1.5).is_err());
    }

    #[test]
    fn zero_control_rate_leaves_no_sample_size_estimate() {
        let obs = ConversionObservation::new(0, 500, 5, 500).unwrap();
        let report = tester().comprehensive_test(&obs).unwrap();
        assert!(report.min_sample_size_mde_10pct.is_none());
    }

    #[test]
    fn min_sample_size_is_present_for_ordinary_rates() {
        let obs = ConversionObservation::new(100, 5000, 150, 5000).unwrap();
        let report = tester().comprehensive_test(&obs).unwrap();
        let n = report.min_sample_size_mde_10pct.unwrap();
        assert!(n > 10_000, "n was {n}");
    }

    #[test]
    fn report_serializes_to_json() {
        let obs = ConversionObservation::new(8, 100, 15, 100).unwrap();
        let report = tester().comprehensive_test(&obs).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"decision\""));
        assert!(json.contains("\"fisher_exact\""));
    }
}
