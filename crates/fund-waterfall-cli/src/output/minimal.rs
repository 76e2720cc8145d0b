use serde_json::Value;

use super::metric_text;

/// Print just the headline answer.
///
/// Looks for the metrics in priority order, either directly on the result
/// (metrics command) or under `core_metrics` (calculate command).
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    let metrics = result_obj.get("core_metrics").unwrap_or(result_obj);

    let priority_keys = ["irr", "dpi", "static_payback", "dynamic_payback"];

    for key in &priority_keys {
        if let Some(text) = metrics.get(*key).and_then(metric_text) {
            println!("{}", text);
            return;
        }
    }

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
