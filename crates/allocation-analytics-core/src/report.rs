use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, debug_span, warn};

use crate::aggregator::{evaluate_profile, resolve_profile, PerformanceMetrics};
use crate::benchmark::{
    composite_benchmarks, inflation_series, resolve_benchmarks, BenchmarkResolution,
    BenchmarkSeries,
};
use crate::config::AnalyticsConfig;
use crate::covariance::{annualized_covariance, CovarianceMatrix};
use crate::drawdown::analyze_drawdown;
use crate::error::{AnalyticsError, ErrorKind};
use crate::prices::PriceSeries;
use crate::returns::{compute_returns, cumulative_series, ReturnSeries};
use crate::risk_decomposition::{decompose_profile, RiskDecomposition};
use crate::types::*;
use crate::weights::WeightProfile;
use crate::AnalyticsResult;

/// Everything the engine needs for one pass.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub prices: PriceSeries,
    /// Evaluated and reported in this order
    pub profiles: Vec<WeightProfile>,
    /// Inclusive filter; the whole table when absent
    pub window: Option<DateWindow>,
    pub config: AnalyticsConfig,
}

/// A profile's result next to the blend it is compared with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub name: String,
    pub annualized_return: Rate,
    /// Profile annualised return minus the blend's
    pub excess_annualized_return: Rate,
    /// The blend's cumulative performance over the same dates
    pub cumulative: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReport {
    pub name: String,
    pub metrics: PerformanceMetrics,
    /// Periods from the worst peak to its trough
    pub drawdown_duration_periods: usize,
    pub cumulative: Vec<SeriesPoint>,
    pub underwater: Vec<SeriesPoint>,
    pub risk_decomposition: RiskDecomposition,
    /// Sum of the entered weights, in percent
    pub total_weight_percent: Percent,
    pub excluded_assets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileFailure {
    pub name: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Result for one profile. A failure never affects the other profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileOutcome {
    Ok(ProfileReport),
    Failed(ProfileFailure),
}

impl ProfileOutcome {
    pub fn name(&self) -> &str {
        match self {
            ProfileOutcome::Ok(r) => &r.name,
            ProfileOutcome::Failed(f) => &f.name,
        }
    }

    pub fn report(&self) -> Option<&ProfileReport> {
        match self {
            ProfileOutcome::Ok(r) => Some(r),
            ProfileOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Dates actually covered after filtering
    pub window: DateWindow,
    pub periods: usize,
    pub periods_per_year: u32,
    pub profiles: Vec<ProfileOutcome>,
    pub benchmarks: BenchmarkResolution,
    pub benchmark_series: Vec<BenchmarkSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflation: Option<Vec<SeriesPoint>>,
}

impl PerformanceReport {
    pub fn profile(&self, name: &str) -> Option<&ProfileOutcome> {
        self.profiles.iter().find(|p| p.name() == name)
    }
}

/// Run the whole engine: filter, derive returns, then evaluate every profile.
///
/// Table-level problems (bad prices, empty window, invalid configuration)
/// fail the call. Problems specific to one profile are reported in that
/// profile's [`ProfileOutcome::Failed`] entry instead.
pub fn build_report(input: &ReportInput) -> AnalyticsResult<ComputationOutput<PerformanceReport>> {
    let start = Instant::now();
    let _span = debug_span!("build_report", profiles = input.profiles.len()).entered();
    let mut warnings: Vec<String> = Vec::new();

    let config = &input.config;
    config.validate()?;
    let periods_per_year = config.periods_per_year();

    let prices = match &input.window {
        Some(window) => input.prices.slice(window)?,
        None => input.prices.clone(),
    };
    let returns = compute_returns(&prices)?;
    debug!(rows = prices.len(), periods = returns.len(), "derived returns");

    let cov = annualized_covariance(
        &returns,
        config.frequency.annualization_factor(),
        config.covariance_estimator,
    );
    if !cov.is_estimated(config.covariance_estimator) {
        warnings.push(format!(
            "Only {} return observation(s) in the window; volatility reported as zero",
            returns.len()
        ));
    }

    let benchmarks = resolve_benchmarks(prices.columns(), &config.benchmark_rules);
    warnings.extend(
        benchmarks
            .ambiguous
            .iter()
            .map(|a| format!("Ambiguous benchmark match: {a}")),
    );
    let (benchmark_series, skipped_blends) = composite_benchmarks(
        &returns,
        &benchmarks,
        &config.benchmark_blends,
        config.cumulative_base,
        periods_per_year,
    )?;
    warnings.extend(
        skipped_blends
            .iter()
            .map(|s| format!("Benchmark blend skipped: {s}")),
    );
    let inflation = match inflation_series(&returns, &benchmarks, config.cumulative_base) {
        Ok(series) => series,
        Err(e) => {
            warn!(error = %e, "inflation series dropped");
            warnings.push(format!("Inflation reference dropped: {e}"));
            None
        }
    };

    let profiles: Vec<ProfileOutcome> = input
        .profiles
        .iter()
        .map(|profile| {
            match evaluate_one(profile, &returns, &cov, &benchmark_series, config) {
                Ok(report) => {
                    if !report.excluded_assets.is_empty() {
                        warnings.push(format!(
                            "{}: not in price data, excluded: {}",
                            report.name,
                            report.excluded_assets.join(", ")
                        ));
                    }
                    if report.risk_decomposition.is_degenerate() {
                        warnings.push(format!(
                            "{}: zero portfolio variance, risk decomposition not applicable",
                            report.name
                        ));
                    }
                    ProfileOutcome::Ok(report)
                }
                Err(e) => {
                    warn!(profile = %profile.name, error = %e, "profile evaluation failed");
                    warnings.push(format!("{}: {}", profile.name, e));
                    ProfileOutcome::Failed(ProfileFailure {
                        name: profile.name.clone(),
                        kind: e.kind(),
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let report = PerformanceReport {
        window: prices.full_window(),
        periods: returns.len(),
        periods_per_year,
        profiles,
        benchmarks,
        benchmark_series,
        inflation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Allocation Analytics (geometric annualised return, covariance volatility, max drawdown, variance decomposition)",
        &serde_json::json!({
            "observations": returns.len(),
            "frequency": format!("{:?}", config.frequency),
            "covariance_estimator": format!("{:?}", config.covariance_estimator),
            "cumulative_base": format!("{:?}", config.cumulative_base),
            "weights": "percent / 100, not normalised to their sum",
        }),
        warnings,
        elapsed,
        report,
    ))
}

fn evaluate_one(
    profile: &WeightProfile,
    returns: &ReturnSeries,
    cov: &CovarianceMatrix,
    benchmark_series: &[BenchmarkSeries],
    config: &AnalyticsConfig,
) -> AnalyticsResult<ProfileReport> {
    let resolved = resolve_profile(profile, returns.columns())?;
    let (series, metrics) = evaluate_profile(returns, cov, &resolved, config.periods_per_year())?;
    let risk_decomposition = decompose_profile(cov, &resolved)?;
    let drawdown = analyze_drawdown(&series)?;

    let benchmark = benchmark_series
        .iter()
        .find(|b| b.profile.as_deref() == Some(profile.name.as_str()))
        .map(|b| -> AnalyticsResult<BenchmarkComparison> {
            let excess = metrics
                .annualized_return
                .checked_sub(b.annualized_return)
                .ok_or_else(|| AnalyticsError::Overflow {
                    context: format!("excess return over '{}'", b.name),
                })?;
            Ok(BenchmarkComparison {
                name: b.name.clone(),
                annualized_return: b.annualized_return,
                excess_annualized_return: excess,
                cumulative: b.cumulative.clone(),
            })
        })
        .transpose()?;

    let underwater = returns
        .dates()
        .iter()
        .zip(drawdown.underwater.iter())
        .map(|(date, dd)| SeriesPoint {
            date: *date,
            value: *dd,
        })
        .collect();

    Ok(ProfileReport {
        name: profile.name.clone(),
        cumulative: cumulative_series(returns.dates(), &series, config.cumulative_base)?,
        underwater,
        drawdown_duration_periods: drawdown.duration_periods,
        metrics,
        risk_decomposition,
        total_weight_percent: profile.total_percent(),
        excluded_assets: resolved.excluded,
        benchmark,
    })
}
