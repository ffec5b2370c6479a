//! Experiment scenario definitions, loadable from TOML.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which step of the view/cart/purchase funnel a scenario targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMetric {
    /// Views that lead to an add-to-cart.
    ViewToCart,
    /// Carts that lead to a purchase.
    CartToPurchase,
    /// Views that lead to a purchase.
    ViewToPurchase,
}

impl TargetMetric {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ViewToCart => "view_to_cart",
            Self::CartToPurchase => "cart_to_purchase",
            Self::ViewToPurchase => "view_to_purchase",
        }
    }

    /// All funnel metrics, in funnel order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::ViewToCart, Self::CartToPurchase, Self::ViewToPurchase]
    }
}

/// Business priority of a scenario, used for report ordering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One planned experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target_metric: TargetMetric,
    /// Expected control-arm rate of the target metric.
    pub baseline_rate: f64,
    /// Expected relative lift of the variant, e.g. 0.10 for +10%.
    pub expected_lift: f64,
    /// How long the experiment is planned to run.
    pub duration_days: u32,
    pub priority: Priority,
}

impl Scenario {
    /// Variant-arm rate implied by the baseline and expected lift.
    #[must_use]
    pub fn variant_rate(&self) -> f64 {
        self.baseline_rate * (1.0 + self.expected_lift)
    }
}

/// A batch of scenarios, as loaded from a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// Loads scenarios from a TOML file, merged with `ABLAB_`-prefixed
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let set: Self = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("ABLAB_"))
            .extract()?;
        Ok(set)
    }

    /// Parses scenarios from in-memory TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let set: Self = Figment::new().merge(Toml::string(toml)).extract()?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        [[scenarios]]
        id = "exp_001"
        name = "Free shipping banner"
        description = "Banner on the product page advertising free shipping"
        target_metric = "view_to_cart"
        baseline_rate = 0.08
        expected_lift = 0.10
        duration_days = 14
        priority = "HIGH"

        [[scenarios]]
        id = "exp_002"
        name = "One-click checkout"
        target_metric = "cart_to_purchase"
        baseline_rate = 0.35
        expected_lift = 0.05
        duration_days = 21
        priority = "MEDIUM"
    "#;

    #[test]
    fn parses_a_scenario_file() {
        let set = ScenarioSet::from_toml_str(EXAMPLE).unwrap();
        assert_eq!(set.scenarios.len(), 2);

        let first = &set.scenarios[0];
        assert_eq!(first.id, "exp_001");
        assert_eq!(first.target_metric, TargetMetric::ViewToCart);
        assert_eq!(first.priority, Priority::High);
        assert!((first.variant_rate() - 0.088).abs() < 1e-12);

        // description is optional
        assert!(set.scenarios[1].description.is_empty());
    }

    #[test]
    fn rejects_unknown_metric_names() {
        let bad = EXAMPLE.replace("view_to_cart", "clicks_to_cash");
        assert!(ScenarioSet::from_toml_str(&bad).is_err());
    }

    #[test]
    fn metric_round_trips_through_serde() {
        for metric in TargetMetric::all() {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.as_str()));
            let back: TargetMetric = serde_json::from_str(&json).unwrap();
            assert_eq!(back, metric);
        }
    }
}
