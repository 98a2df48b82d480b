pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Report profiles, when `value` is a report envelope.
pub(crate) fn report_profiles(value: &Value) -> Option<&Vec<Value>> {
    value
        .get("result")?
        .get("profiles")?
        .as_array()
        .filter(|profiles| profiles.iter().all(|p| p.get("status").is_some()))
}

/// Decimals serialise as strings; accept either form.
pub(crate) fn decimal_field(value: &Value, path: &[&str]) -> Option<Decimal> {
    let mut node = value;
    for key in path {
        node = node.get(*key)?;
    }
    match node {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

/// Fraction as a percentage with two decimals, e.g. `0.0525` -> `5.25%`.
pub(crate) fn percent(value: Option<Decimal>) -> String {
    value
        .map(|d| format!("{}%", (d * Decimal::ONE_HUNDRED).round_dp(2)))
        .unwrap_or_default()
}
