use colored::Colorize;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{decimal_field, percent, report_profiles};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(profiles) = report_profiles(value) {
        print_report(value, profiles);
        print_footer(value);
        return;
    }
    match value.get("result") {
        Some(Value::Array(arr)) if arr.iter().all(|a| a.get("classes").is_some()) => {
            print_allocation(arr)
        }
        Some(Value::Array(arr)) => print_array_table(arr),
        Some(result @ Value::Object(_)) => print_flat_object(result),
        Some(other) => println!("{}", format_value(other)),
        None => print_flat_object(value),
    }
    print_footer(value);
}

fn print_report(envelope: &Value, profiles: &[Value]) {
    if let Some(window) = envelope.get("result").and_then(|r| r.get("window")) {
        println!(
            "Window: {} to {} ({} periods)",
            format_value(window.get("start").unwrap_or(&Value::Null)),
            format_value(window.get("end").unwrap_or(&Value::Null)),
            envelope["result"]["periods"]
        );
    }

    let mut builder = Builder::default();
    builder.push_record([
        "Profile",
        "Ann. Return",
        "Ann. Volatility",
        "Max Drawdown",
        "Total Return",
        "Benchmark",
        "Excess",
    ]);
    let mut failures = Vec::new();
    for profile in profiles {
        let name = profile["name"].as_str().unwrap_or_default();
        if profile["status"] != "ok" {
            failures.push(format!(
                "{}: {}",
                name,
                profile["message"].as_str().unwrap_or("failed")
            ));
            continue;
        }
        builder.push_record([
            name.to_string(),
            percent(decimal_field(profile, &["metrics", "annualized_return"])),
            percent(decimal_field(profile, &["metrics", "annualized_volatility"])),
            percent(decimal_field(profile, &["metrics", "max_drawdown"])),
            percent(decimal_field(profile, &["metrics", "total_return"])),
            profile["benchmark"]["name"].as_str().unwrap_or("-").to_string(),
            percent(decimal_field(
                profile,
                &["benchmark", "excess_annualized_return"],
            )),
        ]);
    }
    println!("{}", Table::from(builder));

    print_risk_by_class(profiles);

    if !failures.is_empty() {
        println!("\n{}", "Failed profiles:".red().bold());
        for f in failures {
            println!("  - {}", f);
        }
    }
}

/// One row per asset class, one column per evaluated profile.
fn print_risk_by_class(profiles: &[Value]) {
    let evaluated: Vec<&Value> = profiles.iter().filter(|p| p["status"] == "ok").collect();
    let mut classes: Vec<String> = Vec::new();
    for p in &evaluated {
        if let Some(by_class) = p["risk_decomposition"]["by_class"].as_array() {
            for c in by_class {
                if let Some(class) = c["class"].as_str() {
                    if !classes.iter().any(|k| k == class) {
                        classes.push(class.to_string());
                    }
                }
            }
        }
    }
    if classes.is_empty() {
        return;
    }
    classes.sort();

    let mut builder = Builder::default();
    let mut header = vec!["Risk contribution".to_string()];
    header.extend(evaluated.iter().map(|p| format_value(&p["name"])));
    builder.push_record(header);
    for class in &classes {
        let mut row = vec![if class.is_empty() {
            "(unclassified)".to_string()
        } else {
            class.clone()
        }];
        for p in &evaluated {
            let fraction = p["risk_decomposition"]["by_class"]
                .as_array()
                .and_then(|rows| rows.iter().find(|c| c["class"] == class.as_str()))
                .and_then(|c| decimal_field(c, &["fraction"]));
            row.push(percent(fraction));
        }
        builder.push_record(row);
    }
    println!("\n{}", Table::from(builder));
}

/// `alloc allocation`: one row per (profile, class).
fn print_allocation(allocations: &[Value]) {
    let mut builder = Builder::default();
    builder.push_record(["Profile", "Class", "Weight"]);
    for allocation in allocations {
        let profile = format_value(&allocation["profile"]);
        for class in allocation["classes"].as_array().into_iter().flatten() {
            builder.push_record([
                profile.clone(),
                format_value(&class["class"]),
                percent(decimal_field(class, &["weight"])),
            ]);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Value) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
