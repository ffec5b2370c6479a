//! Sample-size planning command.

use ablab_core::{ExperimentDesign, DEFAULT_ALPHA, DEFAULT_POWER};
use anyhow::Result;
use clap::Args;
use serde_json::json;

/// Arguments for the plan command.
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Expected control-arm conversion rate, e.g. 0.02 for 2%
    #[arg(long)]
    pub baseline_rate: f64,

    /// Minimum detectable effect as a relative lift, e.g. 0.10 for +10%
    #[arg(long)]
    pub mde: f64,

    /// Significance level
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Target statistical power
    #[arg(long, default_value_t = DEFAULT_POWER)]
    pub power: f64,

    /// Average daily users across both arms; enables a duration estimate
    #[arg(long)]
    pub daily_users: Option<f64>,

    /// Emit the plan as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Runs the plan command.
///
/// # Errors
/// Returns an error if the design parameters are out of range.
pub fn run_plan(args: PlanArgs) -> Result<()> {
    let design = ExperimentDesign::new(args.baseline_rate, args.mde)
        .with_alpha(args.alpha)
        .with_power(args.power);

    let sample_size = design.required_sample_size()?;
    let duration_days = match args.daily_users {
        Some(users) => Some(design.test_duration_days(users)?),
        None => None,
    };

    if args.json {
        let plan = json!({
            "baseline_rate": args.baseline_rate,
            "variant_rate": design.variant_rate(),
            "mde": args.mde,
            "alpha": args.alpha,
            "power": args.power,
            "required_sample_size_per_group": sample_size,
            "duration_days": duration_days,
        });
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Experiment plan");
    println!("  Baseline rate:       {:.4}", args.baseline_rate);
    println!("  Variant rate (MDE):  {:.4}", design.variant_rate());
    println!("  Alpha:               {}", args.alpha);
    println!("  Power:               {}", args.power);
    println!("  Required per group:  {sample_size} users");
    println!("  Required total:      {} users", sample_size * 2);
    if let Some(days) = duration_days {
        println!(
            "  Estimated duration:  {days} days (~{:.1} weeks)",
            days as f64 / 7.0
        );
    }

    Ok(())
}
