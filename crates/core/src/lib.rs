pub mod design;
pub mod error;
pub mod observation;
pub mod stats;

pub use design::{ExperimentDesign, DEFAULT_ALPHA, DEFAULT_POWER};
pub use error::StatsError;
pub use observation::ConversionObservation;
pub use stats::{chi_square_independence, normal_cdf, normal_quantile, ChiSquare2x2};
