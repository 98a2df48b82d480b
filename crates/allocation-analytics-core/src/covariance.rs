use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::sqrt_decimal;
use crate::returns::ReturnSeries;
use crate::types::ColumnLabel;

/// Denominator used by the covariance estimator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CovarianceEstimator {
    /// Divide by n - 1 (unbiased)
    #[default]
    Sample,
    /// Divide by n
    Population,
}

impl CovarianceEstimator {
    /// Fewest observations for which the estimator is defined.
    pub fn min_observations(&self) -> usize {
        match self {
            CovarianceEstimator::Sample => 2,
            CovarianceEstimator::Population => 1,
        }
    }
}

/// Annualised covariance matrix, rows and columns in `labels` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    pub labels: Vec<ColumnLabel>,
    pub values: Vec<Vec<Decimal>>,
    /// Return observations behind the estimate
    pub observations: usize,
}

impl CovarianceMatrix {
    pub fn dim(&self) -> usize {
        self.labels.len()
    }

    /// Whether enough observations existed; an all-zero matrix is reported otherwise.
    pub fn is_estimated(&self, estimator: CovarianceEstimator) -> bool {
        self.observations >= estimator.min_observations()
    }

    /// Square submatrix over `indices`, in the given order.
    pub fn submatrix(&self, indices: &[usize]) -> Vec<Vec<Decimal>> {
        indices
            .iter()
            .map(|&i| indices.iter().map(|&j| self.values[i][j]).collect())
            .collect()
    }

    /// Annualised volatility of each column (square root of the diagonal).
    pub fn volatilities(&self) -> Vec<Decimal> {
        (0..self.dim()).map(|i| sqrt_decimal(self.values[i][i])).collect()
    }
}

/// Covariance of periodic returns scaled by `factor` periods per year.
///
/// Only the upper triangle is computed and mirrored, so the result is exactly
/// symmetric. With fewer observations than the estimator needs, the matrix is
/// all zeros.
pub fn annualized_covariance(
    returns: &ReturnSeries,
    factor: Decimal,
    estimator: CovarianceEstimator,
) -> CovarianceMatrix {
    let k = returns.columns().len();
    let n = returns.len();
    let mut values = vec![vec![Decimal::ZERO; k]; k];

    if n >= estimator.min_observations() {
        let n_dec = Decimal::from(n as i64);
        let columns: Vec<Vec<Decimal>> = (0..k).map(|c| returns.column(c)).collect();
        let means: Vec<Decimal> = columns
            .iter()
            .map(|col| col.iter().sum::<Decimal>() / n_dec)
            .collect();
        let denominator = match estimator {
            CovarianceEstimator::Sample => Decimal::from((n - 1) as i64),
            CovarianceEstimator::Population => n_dec,
        };

        for i in 0..k {
            for j in i..k {
                let sum: Decimal = columns[i]
                    .iter()
                    .zip(columns[j].iter())
                    .map(|(x, y)| (x - means[i]) * (y - means[j]))
                    .sum();
                let cov = sum / denominator * factor;
                values[i][j] = cov;
                values[j][i] = cov;
            }
        }
    }

    CovarianceMatrix {
        labels: returns.columns().to_vec(),
        values,
        observations: n,
    }
}
