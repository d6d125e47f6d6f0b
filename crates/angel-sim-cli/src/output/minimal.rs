use serde_json::Value;

use super::result_payload;

/// Print just the key answer: the mean portfolio IRR for a simulation run,
/// otherwise the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result = result_payload(value);

    if let Value::Object(map) = result {
        if let Some(mean) = map.get("mean_irr_pct").and_then(Value::as_f64) {
            println!("{:.1}%", mean);
            return;
        }
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
