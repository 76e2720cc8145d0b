pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
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

/// Flatten the `records` array of a waterfall result into one row per year:
/// year, cash flow, opening principal per tranche, one column per step,
/// carry split and cumulative cash flow.
pub fn distribution_rows(result: &Value) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let records = result.get("records")?.as_array()?;
    let flattened: Vec<Vec<(String, String)>> = records.iter().map(flatten_record).collect();
    let headers: Vec<String> = flattened.first()?.iter().map(|(k, _)| k.clone()).collect();
    let rows = flattened
        .into_iter()
        .map(|cells| cells.into_iter().map(|(_, v)| v).collect())
        .collect();
    Some((headers, rows))
}

fn flatten_record(record: &Value) -> Vec<(String, String)> {
    let mut cells = Vec::new();
    for key in ["year", "net_cash_flow", "distribution_rate"] {
        cells.push((key.to_string(), scalar(record.get(key))));
    }
    if let Some(Value::Array(balances)) = record.get("beginning_balances") {
        for b in balances {
            let tranche = b.get("tranche").and_then(Value::as_str).unwrap_or("fund");
            cells.push((
                format!("{tranche}_beginning_principal"),
                scalar(b.get("principal")),
            ));
        }
    }
    if let Some(Value::Array(steps)) = record.get("steps") {
        for s in steps {
            let column = s.get("column").and_then(Value::as_str).unwrap_or("step");
            cells.push((column.to_string(), scalar(s.get("amount"))));
        }
    }
    for key in ["carry_lp", "carry_gp", "undistributed", "cumulative_cash_flow"] {
        cells.push((key.to_string(), scalar(record.get(key))));
    }
    cells
}

/// Render a serialized `MetricValue` (`{"status": ..., "value"?, "reason"?}`).
/// Returns None for anything that is not one.
pub fn metric_text(value: &Value) -> Option<String> {
    let status = value.get("status")?.as_str()?;
    let text = match (status, value.get("value")) {
        ("computed", Some(v)) => scalar(Some(v)),
        (_, Some(v)) => format!("{} ({status})", scalar(Some(v))),
        (_, None) => format!("n/a ({status})"),
    };
    Some(text)
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_distribution_rows_flatten_steps() {
        let result = json!({
            "records": [{
                "year": 1,
                "net_cash_flow": "200",
                "distribution_rate": "0.2",
                "beginning_balances": [{ "tranche": "fund", "principal": "1000", "accrued_hurdle": "0" }],
                "steps": [
                    { "column": "accrued_hurdle_return", "kind": "accrue_hurdle", "tranche": "fund", "amount": "80" },
                    { "column": "principal_repayment", "kind": "pay_principal", "tranche": "fund", "amount": "200" }
                ],
                "carry_lp": "0",
                "carry_gp": "0",
                "undistributed": "0",
                "cumulative_cash_flow": "-800"
            }]
        });
        let (headers, rows) = distribution_rows(&result).unwrap();
        assert_eq!(headers[3], "fund_beginning_principal");
        assert_eq!(headers[5], "principal_repayment");
        assert_eq!(rows[0][0], "1");
        assert_eq!(rows[0][5], "200");
        assert_eq!(rows[0].len(), headers.len());
    }

    #[test]
    fn test_metric_text() {
        assert_eq!(
            metric_text(&json!({ "status": "computed", "value": "1.10" })).unwrap(),
            "1.10"
        );
        assert_eq!(
            metric_text(&json!({ "status": "unreachable", "reason": "never" })).unwrap(),
            "n/a (unreachable)"
        );
        assert!(metric_text(&json!("8")).is_none());
    }
}
