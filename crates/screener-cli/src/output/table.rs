use std::str::FromStr;

use rust_decimal::Decimal;
use screener_core::loader::format_compact;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell_text, result_of};

/// Dollar amounts shown as `$1.50B` rather than raw digits.
const MONEY_COLUMNS: [&str; 5] = [
    "Market Cap",
    "Enterprise Value",
    "Revenue",
    "Net Income",
    "total_market_cap",
];

fn display_cell(key: &str, value: &Value) -> String {
    if MONEY_COLUMNS.contains(&key) {
        if let Some(amount) = value.as_str().and_then(|s| Decimal::from_str(s).ok()) {
            return format_compact(Some(amount), "$", 2);
        }
    }
    cell_text(value, "-")
}

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    let result = result_of(value);
    match result {
        Value::Object(map) => print_result_object(map),
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", result),
    }

    if let Value::Object(envelope) = value {
        print_envelope_notes(envelope);
    }
}

/// Scalar fields as a Field/Value table, then every array field as its own
/// table under a heading.
fn print_result_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut scalars = 0;
    for (key, val) in map {
        if val.is_array() {
            continue;
        }
        builder.push_record([key.as_str(), &display_cell(key, val)]);
        scalars += 1;
    }
    if scalars > 0 {
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        if let Value::Array(arr) = val {
            println!("\n{}:", key);
            print_array_table(arr);
        }
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(no matching rows)");
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
                            .map(|v| display_cell(h, v))
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", cell_text(item, "-"));
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_money_columns_render_compact() {
        assert_eq!(display_cell("Market Cap", &json!("3400000000000")), "$3.40T");
        assert_eq!(display_cell("total_market_cap", &json!("150000000")), "$150.00M");
        assert_eq!(display_cell("Market Cap", &Value::Null), "-");
        assert_eq!(display_cell("PE Ratio", &json!("28.5")), "28.5");
    }
}
