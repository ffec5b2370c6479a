use clap::{Parser, Subcommand};

mod commands;

use commands::{
    run_analyze, run_generate, run_plan, run_simulate, AnalyzeArgs, GenerateArgs, PlanArgs,
    SimulateArgs,
};

#[derive(Parser)]
#[command(name = "ablab")]
#[command(about = "A/B experiment planning, simulation, and analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the required sample size for an experiment design
    Plan(PlanArgs),
    /// Estimate empirical power for a design via Monte Carlo simulation
    Simulate(SimulateArgs),
    /// Generate synthetic daily experiment data from a scenario file
    Generate(GenerateArgs),
    /// Run the full test panel over a daily-data CSV and emit verdicts
    Analyze(AnalyzeArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Plan(args) => run_plan(args)?,
        Commands::Simulate(args) => run_simulate(args)?,
        Commands::Generate(args) => run_generate(args)?,
        Commands::Analyze(args) => run_analyze(args)?,
    }

    Ok(())
}
