//! Observed conversion counts for a two-arm experiment.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// Aggregated conversion counts for control (A) and variant (B).
///
/// Construction validates that both totals are positive and that neither arm
/// converted more users than it saw, so every downstream test can assume a
/// well-formed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionObservation {
    /// Conversions in the control arm.
    pub control_conversions: u64,
    /// Users exposed to the control arm.
    pub control_total: u64,
    /// Conversions in the variant arm.
    pub variant_conversions: u64,
    /// Users exposed to the variant arm.
    pub variant_total: u64,
}

impl ConversionObservation {
    /// Creates a validated observation.
    ///
    /// # Errors
    /// Returns `InvalidParameter` when a total is zero or an arm reports more
    /// conversions than exposures.
    pub fn new(
        control_conversions: u64,
        control_total: u64,
        variant_conversions: u64,
        variant_total: u64,
    ) -> Result<Self, StatsError> {
        if control_total == 0 {
            return Err(StatsError::invalid(
                "control_total",
                "must be greater than zero",
            ));
        }
        if variant_total == 0 {
            return Err(StatsError::invalid(
                "variant_total",
                "must be greater than zero",
            ));
        }
        if control_conversions > control_total {
            return Err(StatsError::invalid(
                "control_conversions",
                format!("{control_conversions} conversions exceed total {control_total}"),
            ));
        }
        if variant_conversions > variant_total {
            return Err(StatsError::invalid(
                "variant_conversions",
                format!("{variant_conversions} conversions exceed total {variant_total}"),
            ));
        }

        Ok(Self {
            control_conversions,
            control_total,
            variant_conversions,
            variant_total,
        })
    }

    /// Control conversion rate.
    #[must_use]
    pub fn control_rate(&self) -> f64 {
        self.control_conversions as f64 / self.control_total as f64
    }

    /// Variant conversion rate.
    #[must_use]
    pub fn variant_rate(&self) -> f64 {
        self.variant_conversions as f64 / self.variant_total as f64
    }

    /// Conversion rate pooled over both arms.
    #[must_use]
    pub fn pooled_rate(&self) -> f64 {
        (self.control_conversions + self.variant_conversions) as f64
            / (self.control_total + self.variant_total) as f64
    }

    /// Absolute rate difference, variant minus control.
    #[must_use]
    pub fn rate_difference(&self) -> f64 {
        self.variant_rate() - self.control_rate()
    }

    /// Relative lift in percent; zero when the control never converts.
    #[must_use]
    pub fn relative_lift_pct(&self) -> f64 {
        let control = self.control_rate();
        if control > 0.0 {
            (self.variant_rate() - control) / control * 100.0
        } else {
            0.0
        }
    }

    /// Exposure count of the smaller arm.
    #[must_use]
    pub fn smaller_arm(&self) -> u64 {
        self.control_total.min(self.variant_total)
    }

    /// 2x2 contingency table: rows are arms, columns converted / not.
    #[must_use]
    pub fn contingency_table(&self) -> [[u64; 2]; 2] {
        [
            [
                self.control_conversions,
                self.control_total - self.control_conversions,
            ],
            [
                self.variant_conversions,
                self.variant_total - self.variant_conversions,
            ],
        ]
    }
}
