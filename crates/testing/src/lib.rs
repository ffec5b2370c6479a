//! Significance-test panel for conversion A/B experiments.
//!
//! Given observed conversion counts for a control and a variant arm, this
//! crate runs a battery of tests (chi-square, two-proportion z-test,
//! Fisher's exact test on small samples, and a Bayesian Beta-Binomial
//! comparison) and reduces them to a single actionable verdict.

pub mod bayesian;
pub mod chi_square;
pub mod fisher;
pub mod power;
pub mod report;
pub mod tester;
pub mod verdict;

pub use bayesian::{BayesianResult, CredibleInterval, DEFAULT_BAYES_SAMPLES};
pub use chi_square::ChiSquareResult;
pub use fisher::{FisherResult, FISHER_MAX_ARM_SIZE};
pub use power::posthoc_power;
pub use report::SummaryRow;
pub use tester::{ConversionTester, TestReport};
pub use verdict::{Confidence, Decision, Verdict};
pub use z_test::ZTestResult;
