use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{distribution_rows, metric_text};

/// Format output as tables: overview, tranche structure, the per-year
/// distribution table and column totals, followed by warnings.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result_tables(result, map),
            None => print_fields(map),
        },
        _ => println!("{}", value),
    }
}

fn print_result_tables(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) if res_map.contains_key("records") => {
            print_overview(res_map);
            print_structure(res_map.get("structure"));
            if let Some((headers, rows)) = distribution_rows(result) {
                println!("\nDistribution by year:");
                let mut builder = Builder::default();
                builder.push_record(headers);
                for row in rows {
                    builder.push_record(row);
                }
                println!("{}", Table::from(builder));
            }
            print_totals(res_map.get("summary"));
        }
        Value::Object(res_map) => print_fields(res_map),
        _ => print_fields(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_overview(res_map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for key in ["investment_target", "calculation_mode"] {
        if let Some(v) = res_map.get(key) {
            builder.push_record([key.to_string(), format_value(v)]);
        }
    }
    if let Some(Value::Object(metrics)) = res_map.get("core_metrics") {
        for (key, val) in metrics {
            builder.push_record([key.clone(), format_value(val)]);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_structure(structure: Option<&Value>) {
    let Some(Value::Array(tranches)) = structure else {
        return;
    };
    let mut builder = Builder::default();
    builder.push_record(["Tranche", "Ratio %", "Amount", "Return rate %"]);
    for t in tranches {
        builder.push_record([
            t.get("tranche").map(format_value).unwrap_or_default(),
            t.get("ratio").map(format_value).unwrap_or_default(),
            t.get("amount").map(format_value).unwrap_or_default(),
            t.get("return_rate").map(format_value).unwrap_or_default(),
        ]);
    }
    println!("\nStructure:");
    println!("{}", Table::from(builder));
}

fn print_totals(summary: Option<&Value>) {
    let Some(Value::Object(summary)) = summary else {
        return;
    };
    let mut builder = Builder::default();
    builder.push_record(["Total", "Amount"]);
    if let Some(Value::Array(columns)) = summary.get("columns") {
        for c in columns {
            builder.push_record([
                c.get("column").map(format_value).unwrap_or_default(),
                c.get("total").map(format_value).unwrap_or_default(),
            ]);
        }
    }
    for key in [
        "total_net_cash_flow",
        "total_distributed",
        "total_undistributed",
        "total_carry_lp",
        "total_carry_gp",
    ] {
        if let Some(v) = summary.get(key) {
            builder.push_record([key.to_string(), format_value(v)]);
        }
    }
    println!("\nTotals:");
    println!("{}", Table::from(builder));
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    if let Some(text) = metric_text(value) {
        return text;
    }
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
