pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The payload of an output envelope, or the value itself.
pub fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// The row array of a result: the result itself when it is an array,
/// otherwise its `rows` field.
pub fn rows_of(result: &Value) -> Option<&[Value]> {
    match result {
        Value::Array(rows) => Some(rows),
        Value::Object(map) => map.get("rows").and_then(Value::as_array).map(Vec::as_slice),
        _ => None,
    }
}

/// Render a scalar cell; `null` renders as `null_text`.
pub fn cell_text(value: &Value, null_text: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null_text.to_string(),
        Value::Array(arr) => arr
            .iter()
            .map(|v| cell_text(v, null_text))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_of_envelope_and_array() {
        let envelope = json!({"result": {"matched": 1, "rows": [{"Symbol": "AAA"}]}});
        assert_eq!(rows_of(result_of(&envelope)).map(<[Value]>::len), Some(1));
        let bare = json!([{"a": 1}, {"a": 2}]);
        assert_eq!(rows_of(result_of(&bare)).map(<[Value]>::len), Some(2));
        assert!(rows_of(&json!({"matched": 1})).is_none());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("12.5"), ""), "12.5");
        assert_eq!(cell_text(&Value::Null, "-"), "-");
        assert_eq!(cell_text(&json!(["a", "b"]), ""), "a, b");
    }
}
