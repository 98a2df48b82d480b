use serde_json::Value;

use super::{decimal_field, percent, report_profiles};

/// Print just the headline numbers.
///
/// Reports give one `profile: annualised return` line each; anything else
/// prints the first field of the result.
pub fn print_minimal(value: &Value) {
    if let Some(profiles) = report_profiles(value) {
        for profile in profiles {
            let name = profile["name"].as_str().unwrap_or_default();
            match decimal_field(profile, &["metrics", "annualized_return"]) {
                Some(ret) => println!("{}: {}", name, percent(Some(ret))),
                None => println!("{}: failed", name),
            }
        }
        return;
    }

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
