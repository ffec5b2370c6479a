//! Monte Carlo design-validation command.

use ablab_sim::{MonteCarloSimulator, SimulationConfig, DEFAULT_TRIALS};
use anyhow::Result;
use clap::Args;

/// Arguments for the simulate command.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// True control-arm conversion rate
    #[arg(long)]
    pub baseline_rate: f64,

    /// True variant-arm conversion rate; overrides --lift
    #[arg(long)]
    pub variant_rate: Option<f64>,

    /// Relative lift applied to the baseline when --variant-rate is absent
    #[arg(long, default_value_t = 0.10)]
    pub lift: f64,

    /// Users per group in each simulated experiment
    #[arg(long)]
    pub sample_size: u64,

    /// Number of simulated experiments
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    pub trials: usize,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Emit the result as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Runs the simulate command.
///
/// # Errors
/// Returns an error if the simulation parameters are out of range.
pub fn run_simulate(args: SimulateArgs) -> Result<()> {
    let variant_rate = args
        .variant_rate
        .unwrap_or(args.baseline_rate * (1.0 + args.lift));

    let mut config =
        SimulationConfig::new(args.baseline_rate, variant_rate, args.sample_size)
            .with_trials(args.trials);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    tracing::info!(
        baseline = args.baseline_rate,
        variant = variant_rate,
        sample_size = args.sample_size,
        trials = args.trials,
        "running Monte Carlo simulation"
    );

    let result = MonteCarloSimulator::new(config).run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Simulation result ({} trials)", result.n_trials);
    println!(
        "  Statistical power:  {:.1}%",
        result.statistical_power * 100.0
    );
    println!("  Average lift:       {:+.2}%", result.average_lift_pct);
    println!(
        "  Control rate:       {:.5} (std {:.5})",
        result.control_rate_mean, result.control_rate_std
    );
    println!(
        "  Variant rate:       {:.5} (std {:.5})",
        result.variant_rate_mean, result.variant_rate_std
    );

    Ok(())
}
