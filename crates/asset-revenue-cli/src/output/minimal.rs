use serde_json::Value;

/// Headline figure of each query, in order of priority.
const HEADLINE_KEYS: [&str; 5] = ["total_npv", "p50", "total", "base_case", "generation_mwh"];

/// Print just the key answer value from the output, falling back to the
/// first field of the result.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            for key in &HEADLINE_KEYS {
                if let Some(val) = map.get(*key).filter(|v| !v.is_null()) {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
            }
        }
        // Time series and stress comparisons: one headline per record.
        Value::Array(items) => {
            for item in items {
                let label = item
                    .get("period")
                    .or_else(|| item.get("scenario"))
                    .map(format_minimal)
                    .unwrap_or_default();
                let total = item.get("total").map(format_minimal).unwrap_or_default();
                println!("{}\t{}", label, total);
            }
        }
        other => println!("{}", format_minimal(other)),
    }
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
