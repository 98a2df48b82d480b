use std::time::Instant;

use allocation_analytics_core::with_metadata;
use clap::Args;
use serde_json::{json, Value};

use crate::input;

/// Arguments for the per-class allocation summary
#[derive(Args)]
pub struct AllocationArgs {
    /// Path to a JSON/YAML weight file; read from stdin when omitted
    #[arg(long)]
    pub weights: Option<String>,
}

pub fn run_allocation(args: AllocationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let table = input::weights::load_weights(&args.weights)?.into_table();
    let allocation = table.allocation_by_class()?;

    let output = with_metadata(
        "Sum of percentage weights per asset class, divided by 100",
        &json!({ "normalized": false }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        allocation,
    );
    Ok(serde_json::to_value(output)?)
}
