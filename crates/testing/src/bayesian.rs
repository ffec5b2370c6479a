//! Bayesian comparison of two conversion rates.
//!
//! Both arms get a flat Beta(1, 1) prior; the posterior of each rate is then
//! Beta(1 + conversions, 1 + non-conversions). Posterior quantities are
//! estimated by Monte Carlo sampling from the two posteriors.

use ablab_core::{ConversionObservation, StatsError};
use rand::Rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};

/// Default posterior sample count for the Bayesian test.
pub const DEFAULT_BAYES_SAMPLES: usize = 100_000;

/// Equal-tailed credible interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CredibleInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Posterior summary of the variant-vs-control comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianResult {
    /// Posterior probability that the variant rate exceeds the control rate.
    pub prob_variant_beats_control: f64,
    /// Expected conversion-rate loss from shipping the variant when the
    /// control is actually better.
    pub expected_loss_variant: f64,
    /// Expected loss from keeping the control when the variant is better.
    pub expected_loss_control: f64,
    /// Posterior mean of the relative lift, in percent of the control rate.
    pub mean_relative_lift_pct: f64,
    /// 95% credible interval of the absolute rate difference (variant - control).
    pub ci_95_absolute: CredibleInterval,
    /// 95% credible interval of the relative lift, in percent of the control rate.
    pub ci_95_relative_pct: CredibleInterval,
    /// Posterior mean of the control rate.
    pub posterior_mean_control: f64,
    /// Posterior mean of the variant rate.
    pub posterior_mean_variant: f64,
    /// Whether the posterior probability clears 0.95 in either direction.
    pub is_significant: bool,
}

/// Runs the Bayesian comparison with `n_samples` posterior draws.
pub fn bayesian_test<R: Rng + ?Sized>(
    obs: &ConversionObservation,
    n_samples: usize,
    rng: &mut R,
) -> Result<BayesianResult, StatsError> {
    if n_samples == 0 {
        return Err(StatsError::invalid(
            "n_samples",
            "must be at least 1".to_string(),
        ));
    }

    let posterior_control = posterior(obs.control_conversions, obs.control_total)?;
    let posterior_variant = posterior(obs.variant_conversions, obs.variant_total)?;

    let mut wins: u64 = 0;
    let mut loss_variant_sum = 0.0;
    let mut loss_control_sum = 0.0;
    let mut abs_diffs = Vec::with_capacity(n_samples);
    let mut rel_diffs_pct = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let p_control = posterior_control.sample(rng);
        let p_variant = posterior_variant.sample(rng);

        if p_variant > p_control {
            wins += 1;
            loss_control_sum += p_variant - p_control;
        } else {
            loss_variant_sum += p_control - p_variant;
        }

        abs_diffs.push(p_variant - p_control);
        rel_diffs_pct.push((p_variant - p_control) / p_control * 100.0);
    }

    let n = n_samples as f64;
    let prob = wins as f64 / n;
    let mean_relative_lift_pct = rel_diffs_pct.iter().sum::<f64>() / n;

    abs_diffs.sort_by(|a, b| a.total_cmp(b));
    rel_diffs_pct.sort_by(|a, b| a.total_cmp(b));

    Ok(BayesianResult {
        prob_variant_beats_control: prob,
        expected_loss_variant: loss_variant_sum / n,
        expected_loss_control: loss_control_sum / n,
        mean_relative_lift_pct,
        ci_95_absolute: CredibleInterval {
            lower: percentile(&abs_diffs, 0.025),
            upper: percentile(&abs_diffs, 0.975),
        },
        ci_95_relative_pct: CredibleInterval {
            lower: percentile(&rel_diffs_pct, 0.025),
            upper: percentile(&rel_diffs_pct, 0.975),
        },
        posterior_mean_control: posterior_mean(obs.control_conversions, obs.control_total),
        posterior_mean_variant: posterior_mean(obs.variant_conversions, obs.variant_total),
        is_significant: prob > 0.95 || prob < 0.05,
    })
}

fn posterior(conversions: u64, total: u64) -> Result<Beta<f64>, StatsError> {
    Beta::new(
        1.0 + conversions as f64,
        1.0 + (total - conversions) as f64,
    )
    .map_err(|err| StatsError::invalid("posterior", err.to_string()))
}

fn posterior_mean(conversions: u64, total: u64) -> f64 {
    (1.0 + conversions as f64) / (2.0 + total as f64)
}

/// Linear-interpolation percentile of pre-sorted samples.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let idx = q * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = idx - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}
