use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::AnalyticsError;
use crate::types::{ColumnLabel, Percent, Rate};
use crate::AnalyticsResult;

/// Profile names offered by the default allocation grid, most defensive first.
pub const DEFAULT_PROFILE_NAMES: [&str; 5] = [
    "Ultra Conservative",
    "Conservative",
    "Moderate",
    "Bold",
    "Aggressive",
];

/// Target weight of one asset, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetWeight {
    /// Asset identifier; for flat tables this is also the class name
    pub asset: String,
    pub percent: Percent,
}

/// A named set of target weights.
///
/// Weights are divided by 100, not by their sum: a profile totalling 80% is
/// 20% unfunded and one totalling 120% is levered. Both are evaluated as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub name: String,
    pub weights: Vec<AssetWeight>,
}

impl WeightProfile {
    pub fn new<I, S>(name: impl Into<String>, weights: I) -> Self
    where
        I: IntoIterator<Item = (S, Percent)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            weights: weights
                .into_iter()
                .map(|(asset, percent)| AssetWeight {
                    asset: asset.into(),
                    percent,
                })
                .collect(),
        }
    }

    /// Sum of the percentages as entered.
    pub fn total_percent(&self) -> Percent {
        self.weights.iter().map(|w| w.percent).sum()
    }

    /// Reject negative weights and assets listed twice.
    pub fn validate(&self) -> AnalyticsResult<()> {
        let mut seen = HashSet::new();
        for w in &self.weights {
            if w.percent < Decimal::ZERO {
                return Err(AnalyticsError::InvalidInput {
                    field: format!("{}.{}", self.name, w.asset),
                    reason: format!("Weight must be non-negative, got {}", w.percent),
                });
            }
            if !seen.insert(w.asset.as_str()) {
                return Err(AnalyticsError::InvalidInput {
                    field: format!("{}.{}", self.name, w.asset),
                    reason: "Asset is listed more than once".into(),
                });
            }
        }
        Ok(())
    }
}

/// One profile's column of the allocation grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileColumn {
    pub name: String,
    pub percents: Vec<Percent>,
}

/// Editable allocation grid: one row per (class, asset), one column per profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    pub rows: Vec<ColumnLabel>,
    pub profiles: Vec<ProfileColumn>,
}

/// Share of a profile's capital in one asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAllocation {
    pub class: String,
    pub weight: Rate,
}

/// Per-profile allocation grouped by asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAllocation {
    pub profile: String,
    pub classes: Vec<ClassAllocation>,
}

impl WeightTable {
    /// All-zero grid over the price columns, the starting point for editing.
    pub fn default_for<S: AsRef<str>>(columns: &[ColumnLabel], profile_names: &[S]) -> Self {
        Self {
            rows: columns.to_vec(),
            profiles: profile_names
                .iter()
                .map(|name| ProfileColumn {
                    name: name.as_ref().to_string(),
                    percents: vec![Decimal::ZERO; columns.len()],
                })
                .collect(),
        }
    }

    fn check_shape(&self) -> AnalyticsResult<()> {
        for p in &self.profiles {
            if p.percents.len() != self.rows.len() {
                return Err(AnalyticsError::InvalidInput {
                    field: format!("profiles.{}", p.name),
                    reason: format!(
                        "{} weights for {} rows",
                        p.percents.len(),
                        self.rows.len()
                    ),
                });
            }
        }
        Ok(())
    }

    /// One [`WeightProfile`] per grid column, keyed by asset identifier.
    pub fn profiles(&self) -> AnalyticsResult<Vec<WeightProfile>> {
        self.check_shape()?;
        Ok(self
            .profiles
            .iter()
            .map(|p| {
                WeightProfile::new(
                    p.name.clone(),
                    self.rows
                        .iter()
                        .zip(p.percents.iter())
                        .map(|(label, pct)| (label.asset.clone(), *pct)),
                )
            })
            .collect())
    }

    /// Sum of weights per asset class, as fractions, classes in name order.
    pub fn allocation_by_class(&self) -> AnalyticsResult<Vec<ProfileAllocation>> {
        self.check_shape()?;
        Ok(self
            .profiles
            .iter()
            .map(|p| {
                let mut by_class: BTreeMap<&str, Decimal> = BTreeMap::new();
                for (label, pct) in self.rows.iter().zip(p.percents.iter()) {
                    *by_class.entry(label.class.as_str()).or_insert(Decimal::ZERO) += pct;
                }
                ProfileAllocation {
                    profile: p.name.clone(),
                    classes: by_class
                        .into_iter()
                        .map(|(class, pct)| ClassAllocation {
                            class: class.to_string(),
                            weight: pct / dec!(100),
                        })
                        .collect(),
                }
            })
            .collect())
    }
}
