pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Column order and display names for segment-shaped rows.
pub(crate) const DISPLAY_COLUMNS: [(&str, &str); 11] = [
    ("segment", "Segment"),
    ("total_loans", "Total Loans"),
    ("pd", "PD"),
    ("lgd", "LGD"),
    ("ead", "EAD"),
    ("avg_ead", "EAD (avg)"),
    ("ecl", "ECL"),
    ("username", "Username"),
    ("role", "Role"),
    ("segment_col", "Grouping"),
    ("timestamp", "Timestamp"),
];

/// Keys of an object in display order: the well-known columns first, then
/// whatever else the object carries.
pub(crate) fn ordered_keys(obj: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut keys: Vec<String> = DISPLAY_COLUMNS
        .iter()
        .filter(|(key, _)| obj.contains_key(*key))
        .map(|(key, _)| key.to_string())
        .collect();
    for key in obj.keys() {
        if !keys.iter().any(|k| k == key) {
            keys.push(key.clone());
        }
    }
    keys
}

pub(crate) fn display_name(key: &str) -> &str {
    DISPLAY_COLUMNS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| *name)
        .unwrap_or(key)
}

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}
