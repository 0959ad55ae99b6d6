use serde_json::{Map, Value};

use super::{flatten_fields, format_scalar, record_lists};

/// Render output as CSV. Objects become `field,value` rows; a record list such
/// as the cash-flow schedule follows as its own header and rows.
pub fn render_csv(value: &Value) -> Result<String, String> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    match value {
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            write_object(&mut wtr, body)?;
        }
        Value::Array(arr) => write_records(&mut wtr, arr)?,
        other => wtr
            .write_record([format_scalar(other)])
            .map_err(|e| e.to_string())?,
    }

    let bytes = wtr.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

fn write_object(wtr: &mut csv::Writer<Vec<u8>>, map: &Map<String, Value>) -> Result<(), String> {
    wtr.write_record(["field", "value"])
        .map_err(|e| e.to_string())?;
    for (key, val) in flatten_fields(map) {
        wtr.write_record([key, val]).map_err(|e| e.to_string())?;
    }
    for (_, items) in record_lists(map) {
        wtr.write_record([""]).map_err(|e| e.to_string())?;
        write_records(wtr, items)?;
    }
    Ok(())
}

fn write_records(wtr: &mut csv::Writer<Vec<u8>>, arr: &[Value]) -> Result<(), String> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([format_scalar(item)])
                .map_err(|e| e.to_string())?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers).map_err(|e| e.to_string())?;

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            wtr.write_record(&row).map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}
