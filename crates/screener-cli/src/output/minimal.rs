use serde_json::Value;

use super::{cell_text, result_of, rows_of};

/// Print just the key answer from the output.
///
/// Row results print one symbol per line. Otherwise look for well-known
/// result fields in order of priority, then fall back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = result_of(value);

    if let Some(rows) = rows_of(result_obj) {
        for row in rows {
            let label = ["Symbol", "symbol", "sector", "id", "column"]
                .iter()
                .find_map(|k| row.get(*k).filter(|v| !v.is_null()));
            match label {
                Some(v) => println!("{}", cell_text(v, "null")),
                None => println!("{}", cell_text(row, "null")),
            }
        }
        return;
    }

    let priority_keys = [
        "matched",
        "top_pick",
        "Master_Score",
        "active_criteria",
        "count",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", cell_text(val, "null"));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, cell_text(val, "null"));
            return;
        }
    }

    println!("{}", cell_text(result_obj, "null"));
}
