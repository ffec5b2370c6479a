//! CLI commands for the experiment statistics toolkit.

pub mod analyze;
pub mod generate;
pub mod plan;
pub mod simulate;

pub use analyze::{run_analyze, AnalyzeArgs};
pub use generate::{run_generate, GenerateArgs};
pub use plan::{run_plan, PlanArgs};
pub use simulate::{run_simulate, SimulateArgs};
