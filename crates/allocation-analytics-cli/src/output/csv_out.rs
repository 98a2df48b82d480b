use serde_json::Value;
use std::io;

use super::{decimal_field, report_profiles};

const METRIC_COLUMNS: [&str; 5] = [
    "annualized_return",
    "annualized_volatility",
    "max_drawdown",
    "total_return",
    "periods",
];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(profiles) = report_profiles(value) {
        write_report_csv(&mut wtr, profiles);
    } else {
        match value.get("result").unwrap_or(value) {
            Value::Object(result) => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in result {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
            Value::Array(arr) => write_array_csv(&mut wtr, arr),
            other => {
                let _ = wtr.write_record([&format_csv_value(other)]);
            }
        }
    }

    let _ = wtr.flush();
}

/// One row per profile; failed profiles keep their row with an error and blank metrics.
fn write_report_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, profiles: &[Value]) {
    let mut header = vec!["profile", "status"];
    header.extend(METRIC_COLUMNS);
    header.push("error");
    let _ = wtr.write_record(&header);

    for profile in profiles {
        let mut row = vec![
            format_csv_value(&profile["name"]),
            format_csv_value(&profile["status"]),
        ];
        for metric in METRIC_COLUMNS {
            row.push(
                decimal_field(profile, &["metrics", metric])
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            );
        }
        row.push(format_csv_value(&profile["message"]));
        let _ = wtr.write_record(&row);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
