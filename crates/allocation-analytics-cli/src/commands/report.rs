use allocation_analytics_core::{build_report, AnalyticsConfig, DateWindow, Frequency, ReportInput};
use clap::Args;
use serde_json::Value;
use tracing::debug;

use crate::input;

/// Arguments for a full portfolio report
#[derive(Args)]
pub struct ReportArgs {
    /// Path to the price CSV (first column dates, one column per asset)
    #[arg(long)]
    pub prices: String,

    /// Path to a JSON/YAML weight file; read from stdin when omitted
    #[arg(long)]
    pub weights: Option<String>,

    /// Path to a JSON/YAML engine configuration
    #[arg(long)]
    pub config: Option<String>,

    /// First date of the analysis window (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub start: Option<String>,

    /// Last date of the analysis window (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub end: Option<String>,

    /// Sampling frequency: daily, weekly, monthly, quarterly, annual, or periods per year (252, 12, ...)
    #[arg(long)]
    pub frequency: Option<String>,

    /// The CSV has a class row above the asset-name row
    #[arg(long)]
    pub two_level_header: bool,
}

/// Config file (if any) with a `--frequency` override applied.
pub fn load_config(
    path: &Option<String>,
    frequency: &Option<String>,
) -> Result<AnalyticsConfig, Box<dyn std::error::Error>> {
    let mut config: AnalyticsConfig = match path {
        Some(p) => input::file::read_structured(p)?,
        None => AnalyticsConfig::default(),
    };
    if let Some(f) = frequency {
        config.frequency = parse_frequency(f)?;
    }
    Ok(config)
}

fn parse_frequency(raw: &str) -> Result<Frequency, Box<dyn std::error::Error>> {
    if let Ok(periods) = raw.parse::<u32>() {
        return Ok(Frequency::from_periods_per_year(periods)?);
    }
    match raw.to_lowercase().as_str() {
        "daily" => Ok(Frequency::Daily),
        "weekly" => Ok(Frequency::Weekly),
        "monthly" => Ok(Frequency::Monthly),
        "quarterly" => Ok(Frequency::Quarterly),
        "annual" | "annually" => Ok(Frequency::Annual),
        _ => Err(format!(
            "Unknown frequency '{}'. Use: daily, weekly, monthly, quarterly, annual",
            raw
        )
        .into()),
    }
}

pub fn run_report(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(&args.config, &args.frequency)?;
    let text = input::file::read_text(&args.prices)?;
    let prices = input::prices::parse_price_csv(&text, args.two_level_header)?;
    let profiles = input::weights::load_weights(&args.weights)?.into_profiles()?;

    let window = match (&args.start, &args.end) {
        (None, None) => None,
        (start, end) => {
            let full = prices.full_window();
            Some(DateWindow::new(
                start
                    .as_deref()
                    .map(input::prices::parse_date)
                    .transpose()?
                    .unwrap_or(full.start),
                end.as_deref()
                    .map(input::prices::parse_date)
                    .transpose()?
                    .unwrap_or(full.end),
            ))
        }
    };
    debug!(?window, profiles = profiles.len(), "running report");

    let output = build_report(&ReportInput {
        prices,
        profiles,
        window,
        config,
    })?;

    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_by_name_or_count() {
        assert_eq!(parse_frequency("Daily").unwrap(), Frequency::Daily);
        assert_eq!(parse_frequency("12").unwrap(), Frequency::Monthly);
        assert!(parse_frequency("365").is_err());
        assert!(parse_frequency("hourly").is_err());
    }
}
