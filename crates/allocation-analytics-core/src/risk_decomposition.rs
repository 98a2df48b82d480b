use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregator::ResolvedProfile;
use crate::covariance::CovarianceMatrix;
use crate::error::AnalyticsError;
use crate::math::matrix_vector_multiply;
use crate::types::{ColumnLabel, Rate};
use crate::AnalyticsResult;

/// Whether the variance split is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionStatus {
    /// Portfolio variance is positive; fractions sum to 1
    Defined,
    /// Portfolio variance is zero; every fraction is reported as 0
    Degenerate,
}

/// Variance attributed to one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRiskContribution {
    pub asset: String,
    pub class: String,
    pub weight: Rate,
    /// w_i * (Cov * w)_i
    pub variance_contribution: Decimal,
    /// variance_contribution / (w' * Cov * w)
    pub fraction: Decimal,
}

/// Variance attributed to one asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRiskContribution {
    pub class: String,
    pub fraction: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDecomposition {
    pub status: DecompositionStatus,
    pub portfolio_variance: Decimal,
    pub by_asset: Vec<AssetRiskContribution>,
    /// Classes in name order
    pub by_class: Vec<ClassRiskContribution>,
}

impl RiskDecomposition {
    pub fn is_degenerate(&self) -> bool {
        self.status == DecompositionStatus::Degenerate
    }

    pub fn class_fraction(&self, class: &str) -> Option<Decimal> {
        self.by_class
            .iter()
            .find(|c| c.class == class)
            .map(|c| c.fraction)
    }
}

/// Split `w' * Cov * w` across assets, then sum the shares per asset class.
///
/// `cov` must be square with one row per weight, and `labels` supplies the
/// class of each position.
pub fn decompose_risk(
    weights: &[Rate],
    cov: &[Vec<Decimal>],
    labels: &[ColumnLabel],
) -> AnalyticsResult<RiskDecomposition> {
    let n = weights.len();
    if labels.len() != n {
        return Err(AnalyticsError::InvalidInput {
            field: "labels".into(),
            reason: format!("{} labels for {} weights", labels.len(), n),
        });
    }
    if cov.len() != n || cov.iter().any(|row| row.len() != n) {
        return Err(AnalyticsError::InvalidInput {
            field: "covariance".into(),
            reason: format!("Expected a {n}x{n} matrix"),
        });
    }

    let sigma_w = matrix_vector_multiply(cov, weights);
    let contributions: Vec<Decimal> = weights
        .iter()
        .zip(sigma_w.iter())
        .map(|(w, sw)| *w * *sw)
        .collect();
    let variance: Decimal = contributions.iter().copied().sum();

    // Rounding can leave a zero-risk book a hair below zero.
    let status = if variance > Decimal::ZERO {
        DecompositionStatus::Defined
    } else {
        DecompositionStatus::Degenerate
    };

    let by_asset: Vec<AssetRiskContribution> = labels
        .iter()
        .zip(weights.iter())
        .zip(contributions.iter())
        .map(|((label, w), c)| AssetRiskContribution {
            asset: label.asset.clone(),
            class: label.class.clone(),
            weight: *w,
            variance_contribution: *c,
            fraction: match status {
                DecompositionStatus::Defined => *c / variance,
                DecompositionStatus::Degenerate => Decimal::ZERO,
            },
        })
        .collect();

    let mut grouped: BTreeMap<&str, Decimal> = BTreeMap::new();
    for a in &by_asset {
        *grouped.entry(a.class.as_str()).or_insert(Decimal::ZERO) += a.fraction;
    }
    let by_class = grouped
        .into_iter()
        .map(|(class, fraction)| ClassRiskContribution {
            class: class.to_string(),
            fraction,
        })
        .collect();

    Ok(RiskDecomposition {
        status,
        portfolio_variance: variance.max(Decimal::ZERO),
        by_asset,
        by_class,
    })
}

/// [`decompose_risk`] over the assets a profile matched.
pub fn decompose_profile(
    cov: &CovarianceMatrix,
    profile: &ResolvedProfile,
) -> AnalyticsResult<RiskDecomposition> {
    decompose_risk(
        &profile.weights,
        &cov.submatrix(&profile.indices),
        &profile.labels,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn labels() -> Vec<ColumnLabel> {
        vec![
            ColumnLabel::new("Equity", "S&P 500"),
            ColumnLabel::new("Equity", "MSCI EM"),
            ColumnLabel::new("Fixed Income", "Treasury"),
        ]
    }

    fn cov() -> Vec<Vec<Decimal>> {
        vec![
            vec![dec!(0.04), dec!(0.03), dec!(0.001)],
            vec![dec!(0.03), dec!(0.09), dec!(0.002)],
            vec![dec!(0.001), dec!(0.002), dec!(0.0025)],
        ]
    }

    #[test]
    fn test_fractions_sum_to_one() {
        let w = vec![dec!(0.3), dec!(0.2), dec!(0.5)];
        let rd = decompose_risk(&w, &cov(), &labels()).unwrap();
        assert_eq!(rd.status, DecompositionStatus::Defined);
        let asset_sum: Decimal = rd.by_asset.iter().map(|a| a.fraction).sum();
        let class_sum: Decimal = rd.by_class.iter().map(|c| c.fraction).sum();
        assert!((asset_sum - Decimal::ONE).abs() < dec!(0.000000001));
        assert!((class_sum - Decimal::ONE).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_groups_by_class() {
        let w = vec![dec!(0.3), dec!(0.2), dec!(0.5)];
        let rd = decompose_risk(&w, &cov(), &labels()).unwrap();
        assert_eq!(rd.by_class.len(), 2);
        assert_eq!(rd.by_class[0].class, "Equity");
        let equity = rd.by_asset[0].fraction + rd.by_asset[1].fraction;
        assert_eq!(rd.class_fraction("Equity"), Some(equity));
        // Equity dominates variance despite a 50% bond weight
        assert!(equity > dec!(0.9));
    }

    #[test]
    fn test_zero_variance_is_degenerate() {
        let w = vec![dec!(1)];
        let rd = decompose_risk(&w, &[vec![Decimal::ZERO]], &[ColumnLabel::flat("Cash")]).unwrap();
        assert!(rd.is_degenerate());
        assert_eq!(rd.by_class[0].fraction, Decimal::ZERO);
        assert_eq!(rd.portfolio_variance, Decimal::ZERO);
    }

    #[test]
    fn test_all_zero_weights_are_degenerate() {
        let w = vec![Decimal::ZERO; 3];
        let rd = decompose_risk(&w, &cov(), &labels()).unwrap();
        assert!(rd.is_degenerate());
        assert!(rd.by_asset.iter().all(|a| a.fraction.is_zero()));
    }

    #[test]
    fn test_dimension_mismatch() {
        let w = vec![dec!(0.5), dec!(0.5)];
        assert!(decompose_risk(&w, &cov(), &labels()).is_err());
    }
}
