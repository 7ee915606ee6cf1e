//! Column-oriented in-memory table of securities.
//!
//! Columns are addressed by their exact header string (`"PE Ratio"`,
//! `"Market Cap"`, ...). Every rule that reads a column must tolerate the
//! column being absent; lookups return `Option` rather than panicking.

pub mod column;

pub use column::Column;

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::ScreenerError;
use crate::ScreenerResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: HashMap<String, Column>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from named columns. All columns must share one length.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Column)>,
    ) -> ScreenerResult<Self> {
        let mut table = Table::new();
        for (name, column) in columns {
            table.insert_column(name, column)?;
        }
        Ok(table)
    }

    /// Append a column, or replace an existing one in place.
    pub fn insert_column<S: Into<String>>(
        &mut self,
        name: S,
        column: Column,
    ) -> ScreenerResult<()> {
        let name = name.into();
        if self.names.is_empty() {
            self.rows = column.len();
        } else if column.len() != self.rows {
            return Err(ScreenerError::InvalidInput {
                field: name,
                reason: format!(
                    "column has {} rows, table has {}",
                    column.len(),
                    self.rows
                ),
            });
        }
        if !self.columns.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.columns.insert(name, column);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Numeric cells of a column, or `None` if absent or not numeric.
    pub fn numbers(&self, name: &str) -> Option<&[Option<Decimal>]> {
        match self.columns.get(name) {
            Some(Column::Number(v)) => Some(v),
            _ => None,
        }
    }

    pub fn texts(&self, name: &str) -> Option<&[Option<String>]> {
        match self.columns.get(name) {
            Some(Column::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn dates(&self, name: &str) -> Option<&[Option<NaiveDate>]> {
        match self.columns.get(name) {
            Some(Column::Date(v)) => Some(v),
            _ => None,
        }
    }

    /// True when the column exists and holds at least one non-null cell.
    pub fn has_values(&self, name: &str) -> bool {
        self.columns
            .get(name)
            .is_some_and(|c| c.non_null_count() > 0)
    }

    pub fn number_at(&self, name: &str, row: usize) -> Option<Decimal> {
        self.numbers(name).and_then(|v| v.get(row).copied().flatten())
    }

    pub fn text_at(&self, name: &str, row: usize) -> Option<&str> {
        self.texts(name)
            .and_then(|v| v.get(row))
            .and_then(|c| c.as_deref())
    }

    /// Row subset by index. Indices must be in range; order is preserved.
    pub fn take(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| (name.clone(), col.take(indices)))
            .collect();
        Table {
            names: self.names.clone(),
            columns,
            rows: indices.len(),
        }
    }

    /// Projection onto `names`, in the requested order. Unknown names are
    /// dropped.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let mut out = Table {
            names: Vec::new(),
            columns: HashMap::new(),
            rows: self.rows,
        };
        for name in names {
            let name = name.as_ref();
            if let Some(col) = self.columns.get(name) {
                if !out.columns.contains_key(name) {
                    out.names.push(name.to_string());
                    out.columns.insert(name.to_string(), col.clone());
                }
            }
        }
        out
    }

    /// Rows reordered by a numeric column, nulls last. Ties keep their
    /// original order. An absent or non-numeric column leaves order as is.
    pub fn sorted_by(&self, name: &str, descending: bool) -> Table {
        let Some(values) = self.numbers(name) else {
            return self.clone();
        };
        let mut order: Vec<usize> = (0..self.rows).collect();
        order.sort_by(|&a, &b| match (values[a], values[b]) {
            (Some(x), Some(y)) if descending => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        self.take(&order)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let order: Vec<usize> = (0..self.rows.min(n)).collect();
        self.take(&order)
    }

    /// One JSON object per row, keys in column order.
    pub fn to_records(&self) -> Vec<Value> {
        (0..self.rows).map(|row| self.record(row)).collect()
    }

    pub fn record(&self, row: usize) -> Value {
        let mut map = Map::with_capacity(self.names.len());
        for name in &self.names {
            let value = self.columns[name].json_at(row);
            map.insert(name.clone(), value);
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> Table {
        Table::from_columns([
            ("Symbol", Column::texts([Some("AAA"), Some("BBB"), Some("CCC")])),
            (
                "PE Ratio",
                Column::numbers([Some(dec!(10)), None, Some(dec!(30))]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_columns_rejects_ragged_lengths() {
        let result = Table::from_columns([
            ("A", Column::numbers([Some(dec!(1))])),
            ("B", Column::numbers([Some(dec!(1)), Some(dec!(2))])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_insert_column_replaces_in_place() {
        let mut t = sample();
        t.insert_column("Symbol", Column::texts([Some("X"), Some("Y"), Some("Z")]))
            .unwrap();
        assert_eq!(t.column_names(), &["Symbol".to_string(), "PE Ratio".to_string()]);
        assert_eq!(t.text_at("Symbol", 0), Some("X"));
    }

    #[test]
    fn test_has_values() {
        let mut t = sample();
        t.insert_column("Empty", Column::numbers([None, None, None]))
            .unwrap();
        assert!(t.has_values("PE Ratio"));
        assert!(!t.has_values("Empty"));
        assert!(!t.has_values("Missing"));
    }

    #[test]
    fn test_take_subsets_every_column() {
        let t = sample().take(&[2]);
        assert_eq!(t.num_rows(), 1);
        assert_eq!(t.text_at("Symbol", 0), Some("CCC"));
        assert_eq!(t.number_at("PE Ratio", 0), Some(dec!(30)));
    }

    #[test]
    fn test_select_projects_known_columns() {
        let t = sample().select(&["PE Ratio", "Missing", "Symbol"]);
        assert_eq!(t.column_names(), &["PE Ratio".to_string(), "Symbol".to_string()]);
        assert_eq!(t.num_rows(), 3);
    }

    #[test]
    fn test_sorted_by_puts_nulls_last() {
        let desc = sample().sorted_by("PE Ratio", true);
        assert_eq!(desc.text_at("Symbol", 0), Some("CCC"));
        assert_eq!(desc.text_at("Symbol", 2), Some("BBB"));
        let asc = sample().sorted_by("PE Ratio", false);
        assert_eq!(asc.text_at("Symbol", 0), Some("AAA"));
        assert_eq!(asc.text_at("Symbol", 2), Some("BBB"));
        assert_eq!(sample().head(2).num_rows(), 2);
    }

    #[test]
    fn test_records_keep_column_order_and_nulls() {
        let records = sample().to_records();
        let keys: Vec<&String> = records[1].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Symbol", "PE Ratio"]);
        assert!(records[1]["PE Ratio"].is_null());
    }
}
