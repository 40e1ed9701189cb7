pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Result fields that hold the row-level detail of a query, in the order
/// they are preferred for tabular output.
const DETAIL_KEYS: [&str; 4] = ["rows", "scenarios", "histogram", "contracts"];

/// The primary list of records inside a result object, if any.
pub(crate) fn detail_rows(result: &Map<String, Value>) -> Option<(&'static str, &Vec<Value>)> {
    DETAIL_KEYS.iter().find_map(|key| match result.get(*key) {
        Some(Value::Array(rows)) if rows.first().is_some_and(Value::is_object) => {
            Some((*key, rows))
        }
        _ => None,
    })
}

pub(crate) fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
