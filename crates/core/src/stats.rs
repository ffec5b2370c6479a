//! Shared statistical primitives used across the workspace.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use crate::error::StatsError;

/// Standard normal CDF Φ(x).
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Standard normal quantile Φ⁻¹(p).
///
/// # Errors
/// Returns `InvalidParameter` unless `p` lies strictly inside (0, 1).
pub fn normal_quantile(p: f64) -> Result<f64, StatsError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(StatsError::invalid(
            "p",
            format!("quantile requires p in (0, 1), got {p}"),
        ));
    }
    Ok(Normal::standard().inverse_cdf(p))
}

/// Outcome of a Pearson chi-square test of independence on a 2x2 table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquare2x2 {
    /// Chi-square statistic (no continuity correction).
    pub statistic: f64,
    /// Right-tail p-value at one degree of freedom.
    pub p_value: f64,
    /// Degrees of freedom (always 1 for a 2x2 table).
    pub degrees_of_freedom: u32,
    /// Expected cell frequencies under independence.
    pub expected: [[f64; 2]; 2],
}

/// Pearson chi-square test of independence for a 2x2 contingency table.
///
/// No continuity correction is applied. A table with an all-zero row or
/// column has zero expected frequencies; that happens routinely with sparse
/// conversion data, so it yields a neutral result (statistic 0, p = 1)
/// rather than an error.
#[must_use]
pub fn chi_square_independence(table: [[u64; 2]; 2]) -> ChiSquare2x2 {
    let observed = [
        [table[0][0] as f64, table[0][1] as f64],
        [table[1][0] as f64, table[1][1] as f64],
    ];
    let row = [
        observed[0][0] + observed[0][1],
        observed[1][0] + observed[1][1],
    ];
    let col = [
        observed[0][0] + observed[1][0],
        observed[0][1] + observed[1][1],
    ];
    let n = row[0] + row[1];

    let mut expected = [[0.0; 2]; 2];
    if n > 0.0 {
        for (i, row_total) in row.iter().enumerate() {
            for (j, col_total) in col.iter().enumerate() {
                expected[i][j] = row_total * col_total / n;
            }
        }
    }

    // A zero margin makes the test undefined; report no evidence.
    if n == 0.0 || row.contains(&0.0) || col.contains(&0.0) {
        return ChiSquare2x2 {
            statistic: 0.0,
            p_value: 1.0,
            degrees_of_freedom: 1,
            expected,
        };
    }

    let mut statistic = 0.0;
    for i in 0..2 {
        for j in 0..2 {
            let diff = observed[i][j] - expected[i][j];
            statistic += diff * diff / expected[i][j];
        }
    }

    let p_value = match ChiSquared::new(1.0) {
        Ok(dist) => (1.0 - dist.cdf(statistic)).clamp(0.0, 1.0),
        Err(_) => 1.0,
    };

    ChiSquare2x2 {
        statistic,
        p_value,
        degrees_of_freedom: 1,
        expected,
    }
}
