//! Synthetic day-by-day experiment data.
//!
//! Produces the per-day control/variant funnel counts an instrumented
//! storefront would report, so the analysis pipeline can be exercised
//! end-to-end without live traffic. Daily traffic varies uniformly in
//! [0.90, 1.15) of the baseline; the variant's lift is jittered with
//! multiplicative normal(1.0, 0.05) noise.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::scenario::{Scenario, TargetMetric};

/// Average baseline traffic feeding the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineTraffic {
    /// Average unique users per day across both arms.
    pub daily_users: f64,
    /// Average product views per user.
    pub views_per_user: f64,
    /// Baseline view-to-cart rate, used when the scenario targets another step.
    pub view_to_cart_rate: f64,
    /// Baseline cart-to-purchase rate, used when the scenario targets another step.
    pub cart_to_purchase_rate: f64,
}

impl Default for BaselineTraffic {
    fn default() -> Self {
        Self {
            daily_users: 5_000.0,
            views_per_user: 2.0,
            view_to_cart_rate: 0.08,
            cart_to_purchase_rate: 0.35,
        }
    }
}

/// One day of one scenario's experiment data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub day_number: u32,
    pub scenario_id: String,
    pub scenario_name: String,
    pub target_metric: TargetMetric,
    pub control_users: u64,
    pub control_views: u64,
    pub control_carts: u64,
    pub control_purchases: u64,
    pub variant_users: u64,
    pub variant_views: u64,
    pub variant_carts: u64,
    pub variant_purchases: u64,
}

impl DailyRow {
    /// Control-arm (conversions, total) pair for a funnel metric.
    #[must_use]
    pub fn control_counts(&self, metric: TargetMetric) -> (u64, u64) {
        counts(
            metric,
            self.control_views,
            self.control_carts,
            self.control_purchases,
        )
    }

    /// Variant-arm (conversions, total) pair for a funnel metric.
    #[must_use]
    pub fn variant_counts(&self, metric: TargetMetric) -> (u64, u64) {
        counts(
            metric,
            self.variant_views,
            self.variant_carts,
            self.variant_purchases,
        )
    }
}

fn counts(metric: TargetMetric, views: u64, carts: u64, purchases: u64) -> (u64, u64) {
    match metric {
        TargetMetric::ViewToCart => (carts, views),
        TargetMetric::CartToPurchase => (purchases, carts),
        TargetMetric::ViewToPurchase => (purchases, views),
    }
}

/// Generates `scenario.duration_days` rows of daily data, split 50/50
/// between control and variant.
pub fn generate_daily_rows<R: Rng + ?Sized>(
    scenario: &Scenario,
    traffic: &BaselineTraffic,
    start_date: NaiveDate,
    rng: &mut R,
) -> Vec<DailyRow> {
    let mut rows = Vec::with_capacity(scenario.duration_days as usize);
    for day in 0..scenario.duration_days {
        let daily_variance: f64 = rng.gen_range(0.90..1.15);

        let arm_users = (traffic.daily_users * daily_variance * 0.5) as u64;
        let arm_views = (arm_users as f64 * traffic.views_per_user) as u64;

        let control_rate = scenario.baseline_rate;
        let noise: f64 = match Normal::new(1.0, 0.05) {
            Ok(dist) => dist.sample(rng),
            Err(_) => 1.0,
        };
        let variant_rate = (scenario.variant_rate() * noise).clamp(0.0, 1.0);

        let (control_carts, control_purchases) =
            funnel(arm_views, control_rate, scenario.target_metric, traffic);
        let (variant_carts, variant_purchases) =
            funnel(arm_views, variant_rate, scenario.target_metric, traffic);

        rows.push(DailyRow {
            date: start_date + Duration::days(i64::from(day)),
            day_number: day + 1,
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            target_metric: scenario.target_metric,
            control_users: arm_users,
            control_views: arm_views,
            control_carts,
            control_purchases,
            variant_users: arm_users,
            variant_views: arm_views,
            variant_carts,
            variant_purchases,
        });
    }
    rows
}

/// Walks the view → cart → purchase funnel with `rate` applied at the
/// scenario's target step and baseline rates at the others.
fn funnel(
    views: u64,
    rate: f64,
    metric: TargetMetric,
    traffic: &BaselineTraffic,
) -> (u64, u64) {
    let views_f = views as f64;
    match metric {
        TargetMetric::ViewToCart => {
            let carts = (views_f * rate) as u64;
            let purchases = (carts as f64 * traffic.cart_to_purchase_rate) as u64;
            (carts, purchases)
        }
        TargetMetric::CartToPurchase => {
            let carts = (views_f * traffic.view_to_cart_rate) as u64;
            let purchases = (carts as f64 * rate) as u64;
            (carts, purchases)
        }
        TargetMetric::ViewToPurchase => {
            let carts = (views_f * traffic.view_to_cart_rate) as u64;
            let purchases = (views_f * rate) as u64;
            (carts, purchases)
        }
    }
}
