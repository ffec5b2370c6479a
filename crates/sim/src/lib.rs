//! Monte Carlo design validation and synthetic experiment data.
//!
//! Validates planned A/B-test designs by simulation and generates realistic
//! daily funnel datasets for exercising the analysis pipeline.

pub mod daily;
pub mod scenario;
pub mod simulator;

pub use daily::{generate_daily_rows, BaselineTraffic, DailyRow};
pub use scenario::{Priority, Scenario, ScenarioSet, TargetMetric};
pub use simulator::{MonteCarloSimulator, SimulationConfig, SimulationResult, DEFAULT_TRIALS};
