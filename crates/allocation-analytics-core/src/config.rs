use serde::{Deserialize, Serialize};

use crate::benchmark::{default_benchmark_blends, default_benchmark_rules, BenchmarkBlend, BenchmarkRule};
use crate::covariance::CovarianceEstimator;
use crate::error::AnalyticsError;
use crate::returns::{CumulativeBase, Frequency};
use crate::AnalyticsResult;

/// Engine settings. Every field has a default, so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Sampling frequency of the price table; sets the annualisation factor
    pub frequency: Frequency,
    pub covariance_estimator: CovarianceEstimator,
    pub cumulative_base: CumulativeBase,
    /// Column-matching rules, highest priority first
    pub benchmark_rules: Vec<BenchmarkRule>,
    pub benchmark_blends: Vec<BenchmarkBlend>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::default(),
            covariance_estimator: CovarianceEstimator::default(),
            cumulative_base: CumulativeBase::default(),
            benchmark_rules: default_benchmark_rules(),
            benchmark_blends: default_benchmark_blends(),
        }
    }
}

impl AnalyticsConfig {
    /// Default settings for a table sampled `periods_per_year` times a year.
    pub fn with_periods_per_year(periods_per_year: u32) -> AnalyticsResult<Self> {
        Ok(Self {
            frequency: Frequency::from_periods_per_year(periods_per_year)?,
            ..Self::default()
        })
    }

    pub fn periods_per_year(&self) -> u32 {
        self.frequency.periods_per_year()
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        for rule in &self.benchmark_rules {
            if rule.fragments.iter().all(|f| f.trim().is_empty()) {
                return Err(AnalyticsError::InvalidInput {
                    field: "benchmark_rules".into(),
                    reason: format!("Rule for {:?} has no name fragment", rule.role),
                });
            }
        }
        for blend in &self.benchmark_blends {
            blend.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkRole;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: AnalyticsConfig =
            serde_json::from_str(r#"{ "frequency": "daily", "cumulative_base": "hundred" }"#).unwrap();
        assert_eq!(cfg.periods_per_year(), 252);
        assert_eq!(cfg.cumulative_base, CumulativeBase::Hundred);
        assert_eq!(cfg.covariance_estimator, CovarianceEstimator::Sample);
        assert_eq!(cfg.benchmark_blends.len(), 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_unknown_periods_rejected() {
        assert!(AnalyticsConfig::with_periods_per_year(12).is_ok());
        assert!(matches!(
            AnalyticsConfig::with_periods_per_year(360),
            Err(AnalyticsError::UnsupportedAnnualization(360))
        ));
    }

    #[test]
    fn test_empty_rule_rejected() {
        let mut cfg = AnalyticsConfig::default();
        cfg.benchmark_rules
            .push(BenchmarkRule::new(BenchmarkRole::Inflation, [" "]));
        assert!(cfg.validate().is_err());
    }
}
