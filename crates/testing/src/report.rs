//! Flat per-scenario summary rows for tabular reporting output.

use serde::{Deserialize, Serialize};

use crate::tester::TestReport;
use crate::verdict::{Confidence, Decision};

/// One row of the per-scenario results table.
///
/// `lift_pct` and the confidence-interval bounds are expressed in percentage
/// points of conversion rate, so they can be read directly off a dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    pub scenario_id: String,
    pub scenario_name: String,
    pub target_metric: String,
    pub control_rate: f64,
    pub variant_rate: f64,
    pub lift_pct: f64,
    pub ci_95_lower: f64,
    pub ci_95_upper: f64,
    pub p_value_chi2: f64,
    pub p_value_ztest: f64,
    pub prob_b_beats_a: f64,
    pub statistical_power: f64,
    pub decision: Decision,
    pub confidence: Confidence,
    pub n_significant_tests: usize,
}

impl SummaryRow {
    /// Flattens a full test report into one table row.
    #[must_use]
    pub fn from_report(
        scenario_id: impl Into<String>,
        scenario_name: impl Into<String>,
        target_metric: impl Into<String>,
        report: &TestReport,
    ) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            scenario_name: scenario_name.into(),
            target_metric: target_metric.into(),
            control_rate: report.z_test.control_rate,
            variant_rate: report.z_test.variant_rate,
            lift_pct: report.z_test.difference_pct,
            ci_95_lower: report.z_test.ci_95_lower * 100.0,
            ci_95_upper: report.z_test.ci_95_upper * 100.0,
            p_value_chi2: report.chi_square.p_value,
            p_value_ztest: report.z_test.p_value,
            prob_b_beats_a: report.bayesian.prob_variant_beats_control,
            statistical_power: report.statistical_power,
            decision: report.verdict.decision,
            confidence: report.verdict.confidence,
            n_significant_tests: report.verdict.n_significant_tests,
        }
    }
}
