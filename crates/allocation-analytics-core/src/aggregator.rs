use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::covariance::CovarianceMatrix;
use crate::drawdown::max_drawdown;
use crate::error::AnalyticsError;
use crate::math::{portfolio_variance, sqrt_decimal};
use crate::returns::{total_return, ReturnSeries};
use crate::types::{ColumnLabel, Rate};
use crate::weights::WeightProfile;
use crate::AnalyticsResult;

/// A weight profile matched against the columns of a return table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProfile {
    pub name: String,
    /// Column positions of the matched assets, in profile order
    pub indices: Vec<usize>,
    pub labels: Vec<ColumnLabel>,
    /// Fractional weights (percent / 100), aligned with `indices`
    pub weights: Vec<Rate>,
    /// Assets named by the profile but absent from the data
    pub excluded: Vec<String>,
}

/// Headline statistics of one portfolio over the analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub annualized_return: Rate,
    pub annualized_volatility: Rate,
    /// Non-positive fraction; 0 means no drawdown
    pub max_drawdown: Rate,
    pub total_return: Rate,
    pub periods: usize,
}

/// Match profile assets to columns. Unknown assets are dropped, not zero-filled.
pub fn resolve_profile(
    profile: &WeightProfile,
    columns: &[ColumnLabel],
) -> AnalyticsResult<ResolvedProfile> {
    profile.validate()?;

    let mut resolved = ResolvedProfile {
        name: profile.name.clone(),
        indices: Vec::new(),
        labels: Vec::new(),
        weights: Vec::new(),
        excluded: Vec::new(),
    };

    for w in &profile.weights {
        match columns.iter().position(|c| c.asset == w.asset) {
            Some(idx) => {
                resolved.indices.push(idx);
                resolved.labels.push(columns[idx].clone());
                resolved.weights.push(w.percent / dec!(100));
            }
            None => resolved.excluded.push(w.asset.clone()),
        }
    }

    if resolved.indices.is_empty() {
        return Err(AnalyticsError::NoUsableAssets {
            profile: profile.name.clone(),
        });
    }

    debug!(
        profile = %profile.name,
        matched = resolved.indices.len(),
        excluded = resolved.excluded.len(),
        "resolved weight profile"
    );
    Ok(resolved)
}

/// Weighted sum of asset returns per period.
pub fn portfolio_returns(
    returns: &ReturnSeries,
    profile: &ResolvedProfile,
) -> AnalyticsResult<Vec<Rate>> {
    returns
        .rows()
        .iter()
        .map(|row| {
            profile
                .indices
                .iter()
                .zip(profile.weights.iter())
                .try_fold(Decimal::ZERO, |acc, (&idx, w)| {
                    row[idx].checked_mul(*w).and_then(|c| acc.checked_add(c))
                })
                .ok_or_else(|| AnalyticsError::Overflow {
                    context: format!("weighting returns for profile '{}'", profile.name),
                })
        })
        .collect()
}

/// Geometric annualisation: `(1 + total)^(periods_per_year / n) - 1`.
///
/// An empty series annualises to 0. A wealth path that ends at or below zero
/// annualises to -100%.
pub fn annualized_return(returns: &[Rate], periods_per_year: u32) -> AnalyticsResult<Rate> {
    let n = returns.len();
    if n == 0 {
        return Ok(Decimal::ZERO);
    }

    let growth = Decimal::ONE + total_return(returns)?;
    if growth <= Decimal::ZERO {
        return Ok(-Decimal::ONE);
    }

    let exponent = Decimal::from(periods_per_year) / Decimal::from(n as i64);
    let annual = growth
        .checked_powd(exponent)
        .ok_or_else(|| AnalyticsError::Overflow {
            context: format!("annualising growth {growth} to the power {exponent}"),
        })?;
    Ok(annual - Decimal::ONE)
}

/// `sqrt(w' * Cov * w)` over the profile's matched assets only.
pub fn annualized_volatility(cov: &CovarianceMatrix, profile: &ResolvedProfile) -> Rate {
    let sub = cov.submatrix(&profile.indices);
    sqrt_decimal(portfolio_variance(&profile.weights, &sub))
}

/// Portfolio return series plus its headline metrics.
pub fn evaluate_profile(
    returns: &ReturnSeries,
    cov: &CovarianceMatrix,
    profile: &ResolvedProfile,
    periods_per_year: u32,
) -> AnalyticsResult<(Vec<Rate>, PerformanceMetrics)> {
    let series = portfolio_returns(returns, profile)?;
    let metrics = PerformanceMetrics {
        annualized_return: annualized_return(&series, periods_per_year)?,
        annualized_volatility: annualized_volatility(cov, profile),
        max_drawdown: max_drawdown(&series)?,
        total_return: total_return(&series)?,
        periods: series.len(),
    };
    Ok((series, metrics))
}
