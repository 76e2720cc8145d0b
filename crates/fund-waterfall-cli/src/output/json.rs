use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print the full output envelope to stdout.
pub fn print_json(value: &Value) {
    let rendered = match serde_json::to_string_pretty(value) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("JSON serialization error: {}", e);
            return;
        }
    };
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{}", rendered);
}
