use serde_json::Value;
use std::io;

use super::result_payload;

/// Write output as CSV to stdout.
///
/// A simulation result is written as its histogram (one row per 1-percent
/// bin), which is the shape a charting tool wants. Anything else falls back
/// to field,value rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = result_payload(value);

    match result {
        Value::Object(map) => {
            if let Some(Value::Array(histogram)) = map.get("histogram") {
                write_histogram_csv(&mut wtr, histogram);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(result)]);
        }
    }

    let _ = wtr.flush();
}

fn write_histogram_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, histogram: &[Value]) {
    let _ = wtr.write_record(["irr_pct_lower", "irr_pct_upper", "count", "frequency"]);
    for bin in histogram {
        if let Value::Object(map) = bin {
            let row: Vec<String> = ["lower", "upper", "count", "frequency"]
                .iter()
                .map(|k| map.get(*k).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
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
