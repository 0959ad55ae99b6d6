pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => print!("{}", table::render_table(value)),
        OutputFormat::Csv => match csv_out::render_csv(value) {
            Ok(s) => print!("{}", s),
            Err(e) => eprintln!("CSV serialization error: {}", e),
        },
        OutputFormat::Minimal => println!("{}", minimal::render_minimal(value)),
    }
}

/// Render a scalar JSON value without quotes.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten nested objects into dotted keys, e.g. `solver.method`. Arrays of
/// objects are left to the caller, which renders them as their own section.
pub(crate) fn flatten_fields(map: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into("", map, &mut rows);
    rows
}

fn flatten_into(
    prefix: &str,
    map: &serde_json::Map<String, Value>,
    rows: &mut Vec<(String, String)>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, rows),
            Value::Array(items) if is_record_list(items) => {}
            Value::Array(items) => {
                let joined: Vec<String> = items.iter().map(format_scalar).collect();
                rows.push((name, joined.join(", ")));
            }
            other => rows.push((name, format_scalar(other))),
        }
    }
}

/// Named arrays of objects (cash flows, field errors) within `map`.
pub(crate) fn record_lists(map: &serde_json::Map<String, Value>) -> Vec<(&str, &[Value])> {
    map.iter()
        .filter_map(|(key, val)| match val {
            Value::Array(items) if is_record_list(items) => Some((key.as_str(), items.as_slice())),
            _ => None,
        })
        .collect()
}

fn is_record_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nests_with_dots() {
        let value = json!({
            "yield_to_maturity": "5.66",
            "solver": { "method": "newton_raphson", "iterations": 3 },
            "cash_flows": [{ "period": 1 }]
        });
        let rows = flatten_fields(value.as_object().unwrap());
        assert!(rows.contains(&("solver.method".into(), "newton_raphson".into())));
        assert!(rows.contains(&("yield_to_maturity".into(), "5.66".into())));
        assert!(!rows.iter().any(|(k, _)| k == "cash_flows"));
    }

    #[test]
    fn test_record_lists_found() {
        let value = json!({
            "valid": false,
            "errors": [{ "field": "face_value", "message": "must be positive" }],
            "tags": []
        });
        let lists = record_lists(value.as_object().unwrap());
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].0, "errors");
    }
}
