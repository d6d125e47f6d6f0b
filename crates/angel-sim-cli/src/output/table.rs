use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::result_payload;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    let result = result_payload(value);

    match result {
        Value::Object(map) if map.contains_key("mean_irr_pct") => {
            print_simulation_table(map);
            print_envelope_trailer(value);
        }
        Value::Object(_) => {
            print_flat_object(result);
            print_envelope_trailer(value);
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", result),
    }
}

/// Summary + bucket table for a simulation run. The raw per-trial IRR list
/// and the histogram stay out of the table view; use json or csv for those.
fn print_simulation_table(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);

    let scalar_rows = [
        ("Trials", "trials"),
        ("Failed trials", "failed_trials"),
        ("Mean IRR (%)", "mean_irr_pct"),
        ("Std dev (%)", "std_dev_pct"),
    ];
    for (label, key) in scalar_rows {
        if let Some(val) = map.get(key) {
            builder.push_record([label, &format_value(val)]);
        }
    }

    if let Some(Value::Object(buckets)) = map.get("buckets") {
        let bucket_rows = [
            ("P(IRR < 0%)", "loss"),
            ("P(0% <= IRR < 20%)", "low"),
            ("P(20% <= IRR < 80%)", "mid"),
            ("P(IRR >= 80%)", "high"),
        ];
        for (label, key) in bucket_rows {
            if let Some(val) = buckets.get(key) {
                builder.push_record([label, &format!("{}%", format_value(val))]);
            }
        }
    }

    let table = Table::from(builder);
    println!("{}", table);
}

fn print_envelope_trailer(envelope: &Value) {
    let Some(map) = envelope.as_object() else {
        return;
    };

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

    if let Some(Value::String(meth)) = map.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        map.get(h.as_str())
                            .map(format_value)
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
