use serde_json::Value;
use std::io;

use super::{cell_text, result_of, rows_of};

/// Write output as CSV to stdout. Row results become one record per row;
/// anything else becomes a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    if let Some(rows) = rows_of(result) {
        write_array_csv(&mut wtr, rows);
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &cell_text(val, "")]);
        }
    } else {
        let _ = wtr.write_record([&cell_text(result, "")]);
    }

    let _ = wtr.flush();
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
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
                    .map(|h| map.get(*h).map(|v| cell_text(v, "")).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&cell_text(item, "")]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_written_with_headers_and_blank_nulls() {
        let rows = vec![
            json!({"Symbol": "AAA", "PE Ratio": "12.5"}),
            json!({"Symbol": "BBB", "PE Ratio": null}),
        ];
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_array_csv(&mut wtr, &rows);
        let bytes = wtr.into_inner().ok().expect("buffered writer flushes");
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Symbol,PE Ratio\nAAA,12.5\nBBB,\n");
    }
}
