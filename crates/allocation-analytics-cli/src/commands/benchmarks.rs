use std::time::Instant;

use allocation_analytics_core::benchmark::resolve_benchmarks;
use allocation_analytics_core::with_metadata;
use clap::Args;
use serde_json::{json, Value};

use crate::commands::report::load_config;
use crate::input;

/// Arguments for benchmark column resolution
#[derive(Args)]
pub struct BenchmarksArgs {
    /// Path to the price CSV
    #[arg(long)]
    pub prices: String,

    /// Path to a JSON/YAML engine configuration with custom benchmark rules
    #[arg(long)]
    pub config: Option<String>,

    /// The CSV has a class row above the asset-name row
    #[arg(long)]
    pub two_level_header: bool,
}

pub fn run_benchmarks(args: BenchmarksArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = load_config(&args.config, &None)?;
    config.validate()?;
    let text = input::file::read_text(&args.prices)?;
    let prices = input::prices::parse_price_csv(&text, args.two_level_header)?;

    let resolution = resolve_benchmarks(prices.columns(), &config.benchmark_rules);
    let warnings = resolution.ambiguous.clone();

    let output = with_metadata(
        "Case-insensitive substring match of benchmark rules against asset labels; first match wins",
        &json!({ "rules": config.benchmark_rules }),
        warnings,
        start.elapsed().as_micros() as u64,
        resolution,
    );
    Ok(serde_json::to_value(output)?)
}
