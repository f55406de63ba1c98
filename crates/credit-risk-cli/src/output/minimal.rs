use serde_json::Value;

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = value.get("result").unwrap_or(value);

    // Recommendation prose
    if let Some(Value::String(text)) = result.get("recommendation") {
        println!("{}", text);
        return;
    }

    // Segment rows: one "label: ecl" line each, already ECL-descending
    if let Some(Value::Array(segments)) = result.get("segments") {
        for segment in segments {
            let label = segment.get("segment").map(format_minimal).unwrap_or_default();
            let ecl = segment.get("ecl").map(format_minimal).unwrap_or_default();
            println!("{}: {}", label, ecl);
        }
        return;
    }

    // Combined summary: the headline ECL
    if let Some(ecl) = result.get("ecl") {
        println!("{}", format_minimal(ecl));
        return;
    }

    // Cleaning summary: surviving row count
    if let Some(rows_out) = result.get("rows_out") {
        println!("{}", format_minimal(rows_out));
        return;
    }

    // History listing: row count
    if let Some(count) = value.get("count") {
        println!("{}", format_minimal(count));
        return;
    }

    if let Some(map) = result.as_object() {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }
    println!("{}", format_minimal(result));
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
