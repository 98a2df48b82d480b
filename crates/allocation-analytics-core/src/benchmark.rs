use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregator::annualized_return;
use crate::error::AnalyticsError;
use crate::returns::{cumulative_series, CumulativeBase, ReturnSeries};
use crate::types::{ColumnLabel, Rate, SeriesPoint};
use crate::AnalyticsResult;

/// Reference index a column can play in benchmark construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkRole {
    GlobalEquity,
    GlobalBondAggregate,
    Inflation,
}

/// Case-insensitive substring predicate on the asset label.
///
/// A column satisfies the rule when its asset label contains any fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRule {
    pub role: BenchmarkRole,
    pub fragments: Vec<String>,
}

impl BenchmarkRule {
    pub fn new<S: Into<String>>(role: BenchmarkRole, fragments: impl IntoIterator<Item = S>) -> Self {
        Self {
            role,
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    /// First fragment contained in `label`, if any.
    pub fn matches(&self, label: &ColumnLabel) -> Option<&str> {
        let asset = label.asset.to_uppercase();
        self.fragments
            .iter()
            .find(|f| asset.contains(&f.to_uppercase()))
            .map(String::as_str)
    }
}

/// Fixed equity/bond mix used as a reference for one risk profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkBlend {
    pub name: String,
    /// Weight profile this blend is compared against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub equity_weight: Rate,
    pub bond_weight: Rate,
}

impl BenchmarkBlend {
    pub fn new(name: &str, profile: &str, equity_weight: Rate, bond_weight: Rate) -> Self {
        Self {
            name: name.to_string(),
            profile: Some(profile.to_string()),
            equity_weight,
            bond_weight,
        }
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.equity_weight < Decimal::ZERO || self.bond_weight < Decimal::ZERO {
            return Err(AnalyticsError::InvalidInput {
                field: format!("benchmark_blends.{}", self.name),
                reason: "Blend weights must be non-negative".into(),
            });
        }
        Ok(())
    }
}

/// Rules used when no configuration overrides them, in priority order.
pub fn default_benchmark_rules() -> Vec<BenchmarkRule> {
    vec![
        BenchmarkRule::new(BenchmarkRole::GlobalEquity, ["MSCI WORLD"]),
        BenchmarkRule::new(
            BenchmarkRole::GlobalBondAggregate,
            ["BLOOMBERG US", "GLOBAL AGG"],
        ),
        BenchmarkRule::new(BenchmarkRole::Inflation, ["CPI"]),
    ]
}

/// Reference blends per profile: all bonds, then 10/90 and 20/80 equity/bonds.
pub fn default_benchmark_blends() -> Vec<BenchmarkBlend> {
    vec![
        BenchmarkBlend::new("Benchmark (0/100)", "Ultra Conservative", dec!(0), dec!(1)),
        BenchmarkBlend::new("Benchmark (10/90)", "Conservative", dec!(0.10), dec!(0.90)),
        BenchmarkBlend::new("Benchmark (20/80)", "Moderate", dec!(0.20), dec!(0.80)),
    ]
}

/// Column chosen for a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub index: usize,
    pub label: ColumnLabel,
    pub matched_fragment: String,
}

/// Outcome of matching the rules against a set of columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResolution {
    pub global_equity: Option<ResolvedColumn>,
    pub global_bond_aggregate: Option<ResolvedColumn>,
    pub inflation: Option<ResolvedColumn>,
    /// Roles where more than one column qualified; the first column won
    pub ambiguous: Vec<String>,
}

impl BenchmarkResolution {
    pub fn get(&self, role: BenchmarkRole) -> Option<&ResolvedColumn> {
        match role {
            BenchmarkRole::GlobalEquity => self.global_equity.as_ref(),
            BenchmarkRole::GlobalBondAggregate => self.global_bond_aggregate.as_ref(),
            BenchmarkRole::Inflation => self.inflation.as_ref(),
        }
    }

    fn slot(&mut self, role: BenchmarkRole) -> &mut Option<ResolvedColumn> {
        match role {
            BenchmarkRole::GlobalEquity => &mut self.global_equity,
            BenchmarkRole::GlobalBondAggregate => &mut self.global_bond_aggregate,
            BenchmarkRole::Inflation => &mut self.inflation,
        }
    }
}

/// Assign a column to each role.
///
/// Rules are tried in list order; a role already filled by an earlier rule is
/// skipped. Within a rule, columns are scanned in their original order and the
/// first match wins. Further matches are recorded in `ambiguous`, never
/// treated as errors.
pub fn resolve_benchmarks(columns: &[ColumnLabel], rules: &[BenchmarkRule]) -> BenchmarkResolution {
    let mut resolution = BenchmarkResolution::default();

    for rule in rules {
        if resolution.get(rule.role).is_some() {
            continue;
        }

        let mut hits = columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| rule.matches(c).map(|f| (i, c, f)));

        if let Some((index, label, fragment)) = hits.next() {
            let others: Vec<String> = hits.map(|(_, c, _)| c.to_string()).collect();
            if !others.is_empty() {
                resolution.ambiguous.push(format!(
                    "{:?}: '{}' chosen over {}",
                    rule.role,
                    label,
                    others
                        .iter()
                        .map(|o| format!("'{o}'"))
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            debug!(role = ?rule.role, column = %label, "resolved benchmark column");
            *resolution.slot(rule.role) = Some(ResolvedColumn {
                index,
                label: label.clone(),
                matched_fragment: fragment.to_string(),
            });
        }
    }

    resolution
}

/// A composite reference series built from a blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSeries {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub equity_weight: Rate,
    pub bond_weight: Rate,
    pub returns: Vec<Rate>,
    pub cumulative: Vec<SeriesPoint>,
    pub annualized_return: Rate,
}

/// Blends that could be built, plus a note for each one that overflowed.
pub type CompositeBenchmarks = (Vec<BenchmarkSeries>, Vec<String>);

/// Blend the resolved equity and bond returns per configured mix.
///
/// A blend is skipped when a column it gives non-zero weight to was not
/// resolved, or when its arithmetic overflows. Overflowing blends are named
/// in the second element so the report can warn about them.
pub fn composite_benchmarks(
    returns: &ReturnSeries,
    resolution: &BenchmarkResolution,
    blends: &[BenchmarkBlend],
    base: CumulativeBase,
    periods_per_year: u32,
) -> AnalyticsResult<CompositeBenchmarks> {
    let equity = resolution.global_equity.as_ref().map(|c| returns.column(c.index));
    let bond = resolution
        .global_bond_aggregate
        .as_ref()
        .map(|c| returns.column(c.index));

    let mut out = Vec::new();
    let mut skipped = Vec::new();
    for blend in blends {
        blend.validate()?;

        let leg = |weight: Rate, series: &Option<Vec<Rate>>| -> Option<Vec<Rate>> {
            if weight.is_zero() {
                Some(vec![Decimal::ZERO; returns.len()])
            } else {
                series.clone()
            }
        };
        let (Some(eq), Some(bd)) = (leg(blend.equity_weight, &equity), leg(blend.bond_weight, &bond))
        else {
            debug!(blend = %blend.name, "benchmark blend skipped, source column missing");
            continue;
        };

        match blend_series(blend, &eq, &bd, returns, base, periods_per_year) {
            Ok(series) => out.push(series),
            Err(e) => {
                warn!(blend = %blend.name, error = %e, "benchmark blend skipped");
                skipped.push(format!("{}: {}", blend.name, e));
            }
        }
    }
    Ok((out, skipped))
}

fn blend_series(
    blend: &BenchmarkBlend,
    equity: &[Rate],
    bond: &[Rate],
    returns: &ReturnSeries,
    base: CumulativeBase,
    periods_per_year: u32,
) -> AnalyticsResult<BenchmarkSeries> {
    let series = equity
        .iter()
        .zip(bond.iter())
        .map(|(e, b)| {
            e.checked_mul(blend.equity_weight)
                .zip(b.checked_mul(blend.bond_weight))
                .and_then(|(e, b)| e.checked_add(b))
                .ok_or_else(|| AnalyticsError::Overflow {
                    context: format!("blending benchmark '{}'", blend.name),
                })
        })
        .collect::<AnalyticsResult<Vec<Rate>>>()?;

    Ok(BenchmarkSeries {
        name: blend.name.clone(),
        profile: blend.profile.clone(),
        equity_weight: blend.equity_weight,
        bond_weight: blend.bond_weight,
        annualized_return: annualized_return(&series, periods_per_year)?,
        cumulative: cumulative_series(returns.dates(), &series, base)?,
        returns: series,
    })
}

/// Cumulative inflation path, when a CPI column was resolved.
pub fn inflation_series(
    returns: &ReturnSeries,
    resolution: &BenchmarkResolution,
    base: CumulativeBase,
) -> AnalyticsResult<Option<Vec<SeriesPoint>>> {
    resolution
        .inflation
        .as_ref()
        .map(|c| cumulative_series(returns.dates(), &returns.column(c.index), base))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prices::PriceSeries;
    use crate::returns::compute_returns;
    use chrono::NaiveDate;

    fn flat(names: &[&str]) -> Vec<ColumnLabel> {
        names.iter().map(|n| ColumnLabel::flat(*n)).collect()
    }

    #[test]
    fn test_resolves_all_roles() {
        let cols = flat(&["MSCI World Index", "Bloomberg US Agg", "CPI Index"]);
        let res = resolve_benchmarks(&cols, &default_benchmark_rules());
        assert_eq!(res.global_equity.as_ref().unwrap().index, 0);
        assert_eq!(res.global_bond_aggregate.as_ref().unwrap().index, 1);
        assert_eq!(res.inflation.as_ref().unwrap().index, 2);
        assert!(res.ambiguous.is_empty());
    }

    #[test]
    fn test_no_match_is_all_absent() {
        let cols = flat(&["S&P 500", "Treasury 10Y", "Gold"]);
        let res = resolve_benchmarks(&cols, &default_benchmark_rules());
        assert_eq!(res, BenchmarkResolution::default());
    }

    #[test]
    fn test_first_column_wins_and_ambiguity_is_recorded() {
        let cols = flat(&["Global Agg Hedged", "Bloomberg US Treasury", "MSCI World"]);
        let res = resolve_benchmarks(&cols, &default_benchmark_rules());
        let bond = res.global_bond_aggregate.unwrap();
        assert_eq!(bond.index, 0);
        assert_eq!(bond.matched_fragment, "GLOBAL AGG");
        assert_eq!(res.ambiguous.len(), 1);
        assert!(res.ambiguous[0].contains("Bloomberg US Treasury"));
    }

    #[test]
    fn test_earlier_rule_has_priority() {
        let cols = flat(&["Global Agg", "Bloomberg US Agg"]);
        let rules = vec![
            BenchmarkRule::new(BenchmarkRole::GlobalBondAggregate, ["BLOOMBERG US"]),
            BenchmarkRule::new(BenchmarkRole::GlobalBondAggregate, ["GLOBAL AGG"]),
        ];
        let res = resolve_benchmarks(&cols, &rules);
        assert_eq!(res.global_bond_aggregate.unwrap().index, 1);
    }

    #[test]
    fn test_matches_asset_level_of_two_level_labels() {
        let cols = vec![
            ColumnLabel::new("MSCI World", "Cash"),
            ColumnLabel::new("Equity", "msci world net"),
        ];
        let res = resolve_benchmarks(&cols, &default_benchmark_rules());
        assert_eq!(res.global_equity.unwrap().index, 1);
    }

    fn bench_returns() -> ReturnSeries {
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let prices = PriceSeries::new(
            vec![d(1), d(2), d(3)],
            flat(&["MSCI World", "Global Agg"]),
            vec![
                vec![dec!(100), dec!(100)],
                vec![dec!(110), dec!(101)],
                vec![dec!(99), dec!(101)],
            ],
        )
        .unwrap();
        compute_returns(&prices).unwrap()
    }

    #[test]
    fn test_composite_blends() {
        let rets = bench_returns();
        let res = resolve_benchmarks(rets.columns(), &default_benchmark_rules());
        let series = composite_benchmarks(
            &rets,
            &res,
            &default_benchmark_blends(),
            CumulativeBase::Zero,
            12,
        )
        .unwrap()
        .0;
        assert_eq!(series.len(), 3);
        // 0/100: pure bond
        assert_eq!(series[0].returns, vec![dec!(0.01), dec!(0)]);
        // 20/80: 0.2*0.1 + 0.8*0.01 = 0.028 ; 0.2*-0.1 = -0.02
        assert_eq!(series[2].returns, vec![dec!(0.028), dec!(-0.02)]);
        assert_eq!(series[2].profile.as_deref(), Some("Moderate"));
    }

    #[test]
    fn test_blend_skipped_without_equity() {
        let rets = bench_returns();
        let mut res = resolve_benchmarks(rets.columns(), &default_benchmark_rules());
        res.global_equity = None;
        let series = composite_benchmarks(
            &rets,
            &res,
            &default_benchmark_blends(),
            CumulativeBase::Zero,
            12,
        )
        .unwrap()
        .0;
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "Benchmark (0/100)");
        assert!(inflation_series(&rets, &res, CumulativeBase::Zero).unwrap().is_none());
    }

    #[test]
    fn test_overflowing_blend_is_skipped_not_fatal() {
        let rets = bench_returns();
        let res = resolve_benchmarks(rets.columns(), &default_benchmark_rules());
        let blends = vec![
            BenchmarkBlend::new("Sane", "Moderate", dec!(0.2), dec!(0.8)),
            BenchmarkBlend::new("Huge", "Aggressive", Decimal::MAX, Decimal::ZERO),
        ];
        let (series, skipped) =
            composite_benchmarks(&rets, &res, &blends, CumulativeBase::Zero, 12).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "Sane");
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].starts_with("Huge:"));
    }
}
