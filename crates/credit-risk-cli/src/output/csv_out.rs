use serde_json::Value;
use std::io;

use super::{display_name, ordered_keys};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let rows = value
        .get("result")
        .and_then(|r| r.get("segments"))
        .or_else(|| value.get("result").and_then(|r| r.get("preview")))
        .or_else(|| value.get("records"))
        .and_then(|v| v.as_array());

    match rows {
        Some(rows) => write_rows_csv(&mut wtr, rows),
        None => {
            // Flat field/value dump of the result (or the whole object)
            let flat = value.get("result").unwrap_or(value);
            let _ = wtr.write_record(["field", "value"]);
            if let Some(map) = flat.as_object() {
                for key in ordered_keys(map) {
                    if let Some(val) = map.get(&key) {
                        let rendered = format_csv_value(val);
                        let _ = wtr.write_record([key.as_str(), rendered.as_str()]);
                    }
                }
            }
        }
    }

    let _ = wtr.flush();
}

fn write_rows_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(first) = rows.first().and_then(|r| r.as_object()) else {
        return;
    };
    let keys = ordered_keys(first);
    let _ = wtr.write_record(keys.iter().map(|k| display_name(k)));
    for row in rows {
        if let Some(obj) = row.as_object() {
            let record: Vec<String> = keys
                .iter()
                .map(|k| obj.get(k).map(|v| format_csv_value(v)).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
