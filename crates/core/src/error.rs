//! Error taxonomy for the statistical core.

use thiserror::Error;

/// Errors surfaced by planners, simulators, and testers.
///
/// Degenerate-but-expected numeric situations (a contingency table with an
/// all-zero column) are not errors; the affected routine returns a neutral
/// result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// A caller-supplied parameter is outside its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl StatsError {
    /// Builds an `InvalidParameter` error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_names_the_field() {
        let err = StatsError::invalid("control_total", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "invalid parameter `control_total`: must be greater than zero"
        );
    }
}
