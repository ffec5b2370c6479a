//! Experiment analysis command: aggregates daily rows and runs the full
//! test panel per scenario.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ablab_core::{ConversionObservation, DEFAULT_ALPHA, DEFAULT_POWER};
use ablab_sim::{DailyRow, TargetMetric};
use ablab_testing::{ConversionTester, SummaryRow, TestReport};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

/// Arguments for the analyze command.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Input CSV of daily experiment rows
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output CSV with one summary row per scenario
    #[arg(short, long)]
    pub output: PathBuf,

    /// Optional JSON file with the full panel results for every funnel metric
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Significance level
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Target statistical power
    #[arg(long, default_value_t = DEFAULT_POWER)]
    pub power: f64,

    /// RNG seed for the Bayesian sampler
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Per-scenario accumulated funnel counts.
#[derive(Debug, Default)]
struct ScenarioTotals {
    scenario_name: String,
    target_metric: Option<TargetMetric>,
    days: u32,
    control_views: u64,
    control_carts: u64,
    control_purchases: u64,
    variant_views: u64,
    variant_carts: u64,
    variant_purchases: u64,
}

/// Full panel output for one scenario, across all funnel metrics.
#[derive(Debug, Serialize)]
struct ScenarioReport {
    scenario_id: String,
    scenario_name: String,
    target_metric: TargetMetric,
    days: u32,
    metrics: BTreeMap<&'static str, TestReport>,
}

/// Runs the analyze command.
///
/// # Errors
/// Returns an error if the input cannot be read or outputs cannot be
/// written. Scenarios with degenerate counts are skipped with a warning.
pub fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let totals = aggregate(&args.input)?;
    tracing::info!(scenarios = totals.len(), "aggregated daily rows");

    let mut tester = ConversionTester::new(args.alpha, args.power)?;
    if let Some(seed) = args.seed {
        tester = tester.with_seed(seed);
    }

    let mut summary_writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut reports = Vec::new();

    for (scenario_id, agg) in &totals {
        let Some(target_metric) = agg.target_metric else {
            tracing::warn!(scenario = %scenario_id, "no rows carried a target metric, skipping");
            continue;
        };

        let mut metrics = BTreeMap::new();
        for metric in TargetMetric::all() {
            match test_metric(&tester, agg, metric) {
                Ok(report) => {
                    metrics.insert(metric.as_str(), report);
                }
                Err(err) => {
                    tracing::warn!(
                        scenario = %scenario_id,
                        metric = metric.as_str(),
                        error = %err,
                        "skipping metric"
                    );
                }
            }
        }

        match metrics.get(target_metric.as_str()) {
            Some(report) => {
                let row = SummaryRow::from_report(
                    scenario_id.clone(),
                    agg.scenario_name.clone(),
                    target_metric.as_str(),
                    report,
                );
                summary_writer.serialize(&row)?;
                println!(
                    "{scenario_id}: {} ({}) - {}",
                    row.decision.as_str(),
                    row.confidence.as_str(),
                    report.verdict.recommendation
                );
            }
            None => {
                tracing::warn!(
                    scenario = %scenario_id,
                    "target metric had degenerate counts, no summary row"
                );
            }
        }

        reports.push(ScenarioReport {
            scenario_id: scenario_id.clone(),
            scenario_name: agg.scenario_name.clone(),
            target_metric,
            days: agg.days,
            metrics,
        });
    }
    summary_writer.flush()?;

    if let Some(path) = &args.report {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &reports)?;
        tracing::info!(path = %path.display(), "wrote full JSON report");
    }

    Ok(())
}

fn aggregate(input: &Path) -> Result<BTreeMap<String, ScenarioTotals>> {
    let mut reader = csv::Reader::from_path(input)
        .with_context(|| format!("opening {}", input.display()))?;

    let mut totals: BTreeMap<String, ScenarioTotals> = BTreeMap::new();
    for record in reader.deserialize() {
        let row: DailyRow = record?;
        let entry = totals.entry(row.scenario_id.clone()).or_default();
        entry.scenario_name = row.scenario_name.clone();
        entry.target_metric = Some(row.target_metric);
        entry.days += 1;
        entry.control_views += row.control_views;
        entry.control_carts += row.control_carts;
        entry.control_purchases += row.control_purchases;
        entry.variant_views += row.variant_views;
        entry.variant_carts += row.variant_carts;
        entry.variant_purchases += row.variant_purchases;
    }
    Ok(totals)
}

fn test_metric(
    tester: &ConversionTester,
    totals: &ScenarioTotals,
    metric: TargetMetric,
) -> Result<TestReport> {
    let (control_conv, control_total, variant_conv, variant_total) = match metric {
        TargetMetric::ViewToCart => (
            totals.control_carts,
            totals.control_views,
            totals.variant_carts,
            totals.variant_views,
        ),
        TargetMetric::CartToPurchase => (
            totals.control_purchases,
            totals.control_carts,
            totals.variant_purchases,
            totals.variant_carts,
        ),
        TargetMetric::ViewToPurchase => (
            totals.control_purchases,
            totals.control_views,
            totals.variant_purchases,
            totals.variant_views,
        ),
    };

    let obs = ConversionObservation::new(control_conv, control_total, variant_conv, variant_total)?;
    Ok(tester.comprehensive_test(&obs)?)
}
