use std::io::{self, Write};

use serde_json::Value;

/// Pretty-print JSON to stdout. A closed pipe (`alloc report ... | head`) is not an error.
pub fn print_json(value: &Value) {
    let text = match serde_json::to_string_pretty(value) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("JSON serialization error: {}", e);
            return;
        }
    };
    let mut out = io::stdout().lock();
    if let Err(e) = writeln!(out, "{}", text) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("Failed to write output: {}", e);
        }
    }
}
