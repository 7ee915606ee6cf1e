use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single typed column. Missing cells are `None`, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Column {
    Number(Vec<Option<Decimal>>),
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
}

impl Column {
    pub fn numbers<I: IntoIterator<Item = Option<Decimal>>>(values: I) -> Self {
        Column::Number(values.into_iter().collect())
    }

    pub fn texts<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Column::Text(values.into_iter().map(|v| v.map(Into::into)).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Number(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Column::Number(_) => "number",
            Column::Text(_) => "text",
            Column::Date(_) => "date",
        }
    }

    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Column::Number(v) => v.get(row).map_or(true, Option::is_none),
            Column::Text(v) => v.get(row).map_or(true, Option::is_none),
            Column::Date(v) => v.get(row).map_or(true, Option::is_none),
        }
    }

    /// Number of non-null cells.
    pub fn non_null_count(&self) -> usize {
        (0..self.len()).filter(|&i| !self.is_null(i)).count()
    }

    pub(crate) fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Number(v) => Column::Number(indices.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
            Column::Date(v) => Column::Date(indices.iter().map(|&i| v[i]).collect()),
        }
    }

    pub(crate) fn json_at(&self, row: usize) -> Value {
        match self {
            Column::Number(v) => match v[row] {
                Some(d) => serde_json::to_value(d).unwrap_or(Value::Null),
                None => Value::Null,
            },
            Column::Text(v) => v[row].clone().map(Value::String).unwrap_or(Value::Null),
            Column::Date(v) => v[row]
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
        }
    }
}
