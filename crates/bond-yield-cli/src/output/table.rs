use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten_fields, format_scalar, record_lists};

/// Render output as tables: a field/value table for the headline figures, one
/// table per record list (cash flows, validation errors), then any warnings
/// and the methodology line.
pub fn render_table(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                push_object(&mut out, result);
                push_envelope(&mut out, map);
            }
            _ => push_object(&mut out, map),
        },
        Value::Array(arr) => push_records(&mut out, arr),
        other => {
            out.push_str(&format_scalar(other));
            out.push('\n');
        }
    }
    out
}

fn push_object(out: &mut String, map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten_fields(map) {
        builder.push_record([key, val]);
    }
    out.push_str(&Table::from(builder).to_string());
    out.push('\n');

    for (name, items) in record_lists(map) {
        out.push_str(&format!("\n{}:\n", name));
        push_records(out, items);
    }
}

fn push_records(out: &mut String, arr: &[Value]) {
    if arr.is_empty() {
        out.push_str("(empty)\n");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.clone());

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        out.push_str(&Table::from(builder).to_string());
        out.push('\n');
    } else {
        for item in arr {
            out.push_str(&format_scalar(item));
            out.push('\n');
        }
    }
}

fn push_envelope(out: &mut String, envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for w in warnings {
                if let Value::String(s) = w {
                    out.push_str(&format!("  - {}\n", s));
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        out.push_str(&format!("\nMethodology: {}\n", meth));
    }
}
