use serde_json::Value;

use super::format_scalar;

/// Key answer fields in order of priority. Yields are printed with a `%`.
const PRIORITY_KEYS: [(&str, bool); 4] = [
    ("yield_to_maturity", true),
    ("valid", false),
    ("total_interest_paid", false),
    ("current_yield", true),
];

/// Render just the key answer value, falling back to the first field.
pub fn render_minimal(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for (key, is_percent) in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    let rendered = format_scalar(val);
                    return if is_percent {
                        format!("{}%", rendered)
                    } else {
                        rendered
                    };
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }

    format_scalar(result_obj)
}
