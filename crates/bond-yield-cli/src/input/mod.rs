pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Parse request text as JSON, naming where it came from on failure.
fn parse_request<T: DeserializeOwned>(
    source: &str,
    contents: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    serde_json::from_str(contents).map_err(|e| format!("Failed to parse {source}: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_parse_error_names_source() {
        let err = parse_request::<Value>("stdin", "{ \"face_value\": ").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse stdin:"));
    }

    #[test]
    fn test_parse_request_value() {
        let value: Value = parse_request("stdin", r#"{ "coupon_frequency": "annual" }"#).unwrap();
        assert_eq!(value["coupon_frequency"], "annual");
    }
}
