//! Verdict reduction: collapses the test panel into one decision.
//!
//! The branch order and thresholds below are policy constants; historical
//! experiment decisions were made against them, so they must not drift.

use serde::{Deserialize, Serialize};

/// Power below this marks an experiment as underpowered.
const POWER_FLOOR: f64 = 0.80;

/// Categorical outcome of an experiment analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    WinnerVariant,
    WinnerControl,
    LikelyWinnerVariant,
    LikelyWinnerControl,
    Underpowered,
    Inconclusive,
}

impl Decision {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WinnerVariant => "WINNER_VARIANT",
            Self::WinnerControl => "WINNER_CONTROL",
            Self::LikelyWinnerVariant => "LIKELY_WINNER_VARIANT",
            Self::LikelyWinnerControl => "LIKELY_WINNER_CONTROL",
            Self::Underpowered => "UNDERPOWERED",
            Self::Inconclusive => "INCONCLUSIVE",
        }
    }
}

/// How strongly the panel backs the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// Panel summary consumed by the decision table.
#[derive(Debug, Clone)]
pub struct VerdictInputs {
    /// Names of the sub-tests that flagged significance.
    pub significant_tests: Vec<String>,
    /// Posterior probability that the variant beats the control.
    pub prob_variant_beats_control: f64,
    /// Post-hoc power of the comparison.
    pub statistical_power: f64,
    /// Per-group sample size needed to detect a 10% relative lift, when the
    /// observed control rate admits one.
    pub min_sample_size: Option<u64>,
    /// Number of sub-tests that ran.
    pub total_tests: usize,
}

/// Final verdict attached to a test report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: Decision,
    pub confidence: Confidence,
    pub recommendation: String,
    pub significant_tests: Vec<String>,
    pub n_significant_tests: usize,
    pub total_tests: usize,
}

/// Applies the decision table. Branches are evaluated top to bottom and the
/// first match wins.
#[must_use]
pub fn decide(inputs: VerdictInputs) -> Verdict {
    let n_significant = inputs.significant_tests.len();
    let prob = inputs.prob_variant_beats_control;
    let power = inputs.statistical_power;

    let (decision, confidence, recommendation) = if n_significant >= 2 && prob > 0.95 {
        (
            Decision::WinnerVariant,
            Confidence::High,
            "Ship the variant: multiple tests agree and the posterior strongly favors it."
                .to_string(),
        )
    } else if n_significant >= 2 && prob < 0.05 {
        (
            Decision::WinnerControl,
            Confidence::High,
            "Keep the control: multiple tests agree and the posterior strongly favors it."
                .to_string(),
        )
    } else if n_significant >= 1 && prob > 0.90 && prob < 0.95 {
        (
            Decision::LikelyWinnerVariant,
            Confidence::Medium,
            "The variant is likely better; consider extending the experiment to confirm."
                .to_string(),
        )
    } else if n_significant >= 1 && prob > 0.05 && prob < 0.10 {
        (
            Decision::LikelyWinnerControl,
            Confidence::Medium,
            "The control is likely better; consider extending the experiment to confirm."
                .to_string(),
        )
    } else if power < POWER_FLOOR {
        let recommendation = match inputs.min_sample_size {
            Some(n) => format!(
                "Experiment is underpowered (power {power:.2}); collect at least {n} users \
                 per group to detect a 10% relative lift."
            ),
            None => format!(
                "Experiment is underpowered (power {power:.2}); collect more data before \
                 deciding."
            ),
        };
        (Decision::Underpowered, Confidence::Low, recommendation)
    } else {
        (
            Decision::Inconclusive,
            Confidence::Low,
            "No reliable difference detected; the arms appear equivalent at this sample size."
                .to_string(),
        )
    };

    Verdict {
        decision,
        confidence,
        recommendation,
        n_significant_tests: n_significant,
        significant_tests: inputs.significant_tests,
        total_tests: inputs.total_tests,
    }
}
