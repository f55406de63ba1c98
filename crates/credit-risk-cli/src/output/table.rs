use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{display_name, ordered_keys};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    let Some(map) = value.as_object() else {
        println!("{}", value);
        return;
    };

    if let Some(result) = map.get("result") {
        print_result(result);
        print_envelope_notes(map);
        return;
    }
    if let Some(Value::Array(records)) = map.get("records") {
        print_rows(records);
        return;
    }
    print_flat_object(value);
}

fn print_result(result: &Value) {
    let Some(obj) = result.as_object() else {
        println!("{}", result);
        return;
    };

    // Segment result table
    if let Some(Value::Array(segments)) = obj.get("segments") {
        print_rows(segments);
        if let Some(Value::Array(grouping)) = obj.get("grouping") {
            let columns: Vec<String> = grouping.iter().map(format_value).collect();
            println!("\nGrouped by: {}", columns.join(", "));
        }
        return;
    }

    // Cleaning summary: scalars first, then the typed preview rows
    if let Some(Value::Array(preview)) = obj.get("preview") {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in obj {
            if key != "preview" && key != "columns" {
                let rendered = format_value(val);
                builder.push_record([key.as_str(), rendered.as_str()]);
            }
        }
        println!("{}", Table::from(builder));
        if !preview.is_empty() {
            println!("\nPreview:");
            print_rows(preview);
        }
        return;
    }

    print_flat_object(result);
}

/// Array of uniform objects, one table row each.
fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }
    let Some(first) = rows.first().and_then(|r| r.as_object()) else {
        for row in rows {
            println!("{}", format_value(row));
        }
        return;
    };

    let keys = ordered_keys(first);
    let mut builder = Builder::default();
    builder.push_record(keys.iter().map(|k| display_name(k)));
    for row in rows {
        if let Some(obj) = row.as_object() {
            builder.push_record(
                keys.iter()
                    .map(|k| obj.get(k).map(|v| format_value(v)).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Some(map) = value.as_object() {
        let keys = ordered_keys(map);
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for key in keys {
            if let Some(val) = map.get(&key) {
                let rendered = format_value(val);
                builder.push_record([display_name(&key), rendered.as_str()]);
            }
        }
        println!("{}", Table::from(builder));
    }
}

fn print_envelope_notes(map: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = map.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }
    if let Some(Value::String(methodology)) = map.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
