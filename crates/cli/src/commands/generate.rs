//! Synthetic daily-data generation command.

use std::path::PathBuf;

use ablab_sim::{generate_daily_rows, BaselineTraffic, ScenarioSet};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Arguments for the generate command.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Scenario definition TOML file
    #[arg(short, long)]
    pub scenarios: PathBuf,

    /// Output CSV file for the daily rows
    #[arg(short, long)]
    pub output: PathBuf,

    /// First simulated day (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Average unique users per day across both arms
    #[arg(long, default_value_t = 5000.0)]
    pub daily_users: f64,

    /// Average product views per user
    #[arg(long, default_value_t = 2.0)]
    pub views_per_user: f64,

    /// Baseline view-to-cart rate
    #[arg(long, default_value_t = 0.08)]
    pub view_to_cart_rate: f64,

    /// Baseline cart-to-purchase rate
    #[arg(long, default_value_t = 0.35)]
    pub cart_to_purchase_rate: f64,

    /// RNG seed for reproducible datasets
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Runs the generate command.
///
/// # Errors
/// Returns an error if the scenario file cannot be loaded or the output
/// cannot be written.
pub fn run_generate(args: GenerateArgs) -> Result<()> {
    let set = ScenarioSet::load(&args.scenarios)
        .with_context(|| format!("loading scenarios from {}", args.scenarios.display()))?;

    let traffic = BaselineTraffic {
        daily_users: args.daily_users,
        views_per_user: args.views_per_user,
        view_to_cart_rate: args.view_to_cart_rate,
        cart_to_purchase_rate: args.cart_to_purchase_rate,
    };

    let start_date = args
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let mut total_rows = 0;
    for scenario in &set.scenarios {
        let rows = generate_daily_rows(scenario, &traffic, start_date, &mut rng);
        tracing::info!(
            scenario = %scenario.id,
            days = rows.len(),
            "generated daily data"
        );
        for row in &rows {
            writer.serialize(row)?;
        }
        total_rows += rows.len();
    }
    writer.flush()?;

    println!(
        "Wrote {total_rows} daily rows for {} scenarios to {}",
        set.scenarios.len(),
        args.output.display()
    );

    Ok(())
}
