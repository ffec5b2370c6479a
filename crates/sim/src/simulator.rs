//! Monte Carlo validation of an experiment design.
//!
//! Given baseline and variant conversion rates and a per-group sample size,
//! repeatedly draws both arms from binomial distributions and runs a
//! chi-square test per trial. The fraction of significant trials estimates
//! the empirical power the design would achieve in practice.

use ablab_core::stats::chi_square_independence;
use ablab_core::StatsError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of simulated experiments per run.
pub const DEFAULT_TRIALS: usize = 10_000;

/// Per-trial significance threshold for the empirical power estimate.
const TRIAL_ALPHA: f64 = 0.05;

/// Configuration for one Monte Carlo run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// True conversion rate of the control arm.
    pub baseline_rate: f64,
    /// True conversion rate of the variant arm.
    pub variant_rate: f64,
    /// Users per group in each simulated experiment.
    pub sample_size_per_group: u64,
    /// Number of simulated experiments.
    pub n_trials: usize,
    /// Optional seed for reproducible results.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(baseline_rate: f64, variant_rate: f64, sample_size_per_group: u64) -> Self {
        Self {
            baseline_rate,
            variant_rate,
            sample_size_per_group,
            n_trials: DEFAULT_TRIALS,
            seed: None,
        }
    }

    /// Sets the number of simulated experiments.
    #[must_use]
    pub fn with_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials;
        self
    }

    /// Sets a seed for reproducible simulations.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Aggregate outcome of a Monte Carlo run. Immutable once computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Fraction of trials whose chi-square test was significant at 0.05.
    pub statistical_power: f64,
    /// Mean observed relative lift, in percent, over trials whose control
    /// arm converted at least once.
    pub average_lift_pct: f64,
    pub control_rate_mean: f64,
    pub control_rate_std: f64,
    pub variant_rate_mean: f64,
    pub variant_rate_std: f64,
    pub n_trials: usize,
    pub sample_size_per_group: u64,
}

/// Runs repeated simulated experiments for one design.
#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    config: SimulationConfig,
}

impl MonteCarloSimulator {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Runs the full set of trials.
    pub fn run(&self) -> Result<SimulationResult, StatsError> {
        let cfg = &self.config;
        self.validate()?;

        let n = cfg.sample_size_per_group;
        let control_dist = binomial(n, cfg.baseline_rate, "baseline_rate")?;
        let variant_dist = binomial(n, cfg.variant_rate, "variant_rate")?;

        let mut rng = match cfg.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut significant: usize = 0;
        let mut lift_sum = 0.0;
        let mut lift_count: usize = 0;
        let mut control_rates = Vec::with_capacity(cfg.n_trials);
        let mut variant_rates = Vec::with_capacity(cfg.n_trials);

        for _ in 0..cfg.n_trials {
            let control_conv = control_dist.sample(&mut rng);
            let variant_conv = variant_dist.sample(&mut rng);

            let table = [
                [control_conv, n - control_conv],
                [variant_conv, n - variant_conv],
            ];
            let chi = chi_square_independence(table);
            if chi.p_value < TRIAL_ALPHA {
                significant += 1;
            }

            let control_rate = control_conv as f64 / n as f64;
            let variant_rate = variant_conv as f64 / n as f64;
            control_rates.push(control_rate);
            variant_rates.push(variant_rate);

            // A trial with zero control conversions has no defined lift.
            if control_conv > 0 {
                lift_sum += (variant_rate - control_rate) / control_rate * 100.0;
                lift_count += 1;
            }
        }

        let result = SimulationResult {
            statistical_power: significant as f64 / cfg.n_trials as f64,
            average_lift_pct: if lift_count > 0 {
                lift_sum / lift_count as f64
            } else {
                0.0
            },
            control_rate_mean: mean(&control_rates),
            control_rate_std: std_dev(&control_rates),
            variant_rate_mean: mean(&variant_rates),
            variant_rate_std: std_dev(&variant_rates),
            n_trials: cfg.n_trials,
            sample_size_per_group: n,
        };

        debug!(
            power = result.statistical_power,
            avg_lift_pct = result.average_lift_pct,
            trials = cfg.n_trials,
            "simulation complete"
        );

        Ok(result)
    }

    fn validate(&self) -> Result<(), StatsError> {
        let cfg = &self.config;
        if cfg.sample_size_per_group == 0 {
            return Err(StatsError::invalid(
                "sample_size_per_group",
                "must be at least 1".to_string(),
            ));
        }
        if cfg.n_trials == 0 {
            return Err(StatsError::invalid(
                "n_trials",
                "must be at least 1".to_string(),
            ));
        }
        for (name, rate) in [
            ("baseline_rate", cfg.baseline_rate),
            ("variant_rate", cfg.variant_rate),
        ] {
            if !(rate > 0.0 && rate < 1.0) {
                return Err(StatsError::invalid(
                    name,
                    format!("must be in (0, 1), got {rate}"),
                ));
            }
        }
        Ok(())
    }
}

fn binomial(n: u64, p: f64, name: &'static str) -> Result<Binomial, StatsError> {
    Binomial::new(n, p).map_err(|err| StatsError::invalid(name, err.to_string()))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}
