use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::loader::parse_compact;
use crate::table::{Column, Table};

pub const SYMBOL: &str = "Symbol";
pub const COMPANY_NAME: &str = "Company Name";

/// Inclusive bounds on one numeric column. An absent side is unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
}

impl Bound {
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: Decimal) -> Self {
        Self::new(Some(min), None)
    }

    pub fn at_most(max: Decimal) -> Self {
        Self::new(None, Some(max))
    }

    /// Bounds from compact text such as `"100M"` / `"10B"`. Blank or
    /// unparseable text leaves that side open.
    pub fn parse_compact(min: &str, max: &str) -> Self {
        Self::new(parse_compact(min), parse_compact(max))
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Null never satisfies an active bound.
    pub fn contains(&self, value: Option<Decimal>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(v) = value else {
            return false;
        };
        self.min.map_or(true, |m| v >= m) && self.max.map_or(true, |m| v <= m)
    }
}

/// The complete active query: numeric ranges plus categorical predicates,
/// combined as a single conjunction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Column name -> inclusive bounds.
    pub ranges: BTreeMap<String, Bound>,
    /// Column name -> allowed values. An empty set is inactive.
    pub memberships: BTreeMap<String, BTreeSet<String>>,
    /// Column name -> substrings that must all appear in the cell.
    pub contains_all: BTreeMap<String, Vec<String>>,
    /// Ticker or company name search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(mut self, column: &str, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.ranges.insert(column.to_string(), Bound::new(min, max));
        self
    }

    pub fn min(self, column: &str, min: Decimal) -> Self {
        self.range(column, Some(min), None)
    }

    pub fn max(self, column: &str, max: Decimal) -> Self {
        self.range(column, None, Some(max))
    }

    pub fn member<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.memberships
            .entry(column.to_string())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn contains<I, S>(mut self, column: &str, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contains_all
            .entry(column.to_string())
            .or_default()
            .extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    /// Overlay `other` on `self`; entries in `other` win.
    pub fn merge(mut self, other: &FilterSpec) -> Self {
        for (col, bound) in &other.ranges {
            self.ranges.insert(col.clone(), *bound);
        }
        for (col, set) in &other.memberships {
            self.memberships.insert(col.clone(), set.clone());
        }
        for (col, tokens) in &other.contains_all {
            self.contains_all.insert(col.clone(), tokens.clone());
        }
        if other.search.is_some() {
            self.search = other.search.clone();
        }
        self
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// No predicate would remove any row.
    pub fn is_empty(&self) -> bool {
        self.ranges.values().all(|b| !b.is_active())
            && self.memberships.values().all(BTreeSet::is_empty)
            && self.contains_all.values().all(Vec::is_empty)
            && self.search_term().is_none()
    }

    /// Active predicates that cannot be applied to `table` and are skipped
    /// when filtering: the column is absent, a range targets a date column,
    /// or a categorical predicate targets a non-text column.
    pub fn ignored_columns(&self, table: &Table) -> Vec<String> {
        let rangeable = |c: &str| matches!(table.column(c), Some(Column::Number(_) | Column::Text(_)));
        let textual = |c: &str| matches!(table.column(c), Some(Column::Text(_)));

        let mut ignored: BTreeSet<String> = BTreeSet::new();
        for (col, bound) in &self.ranges {
            if bound.is_active() && !rangeable(col) {
                ignored.insert(col.clone());
            }
        }
        let active_sets = self
            .memberships
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(c, _)| c);
        let active_tokens = self
            .contains_all
            .iter()
            .filter(|(_, t)| !t.is_empty())
            .map(|(c, _)| c);
        for col in active_sets.chain(active_tokens) {
            if !textual(col) {
                ignored.insert(col.clone());
            }
        }
        if self.search_term().is_some() && !textual(SYMBOL) && !textual(COMPANY_NAME) {
            ignored.insert(SYMBOL.to_string());
            ignored.insert(COMPANY_NAME.to_string());
        }
        ignored.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bound_inclusive_and_null_excluding() {
        let b = Bound::new(Some(dec!(0)), Some(dec!(15)));
        assert!(b.contains(Some(dec!(0))));
        assert!(b.contains(Some(dec!(15))));
        assert!(!b.contains(Some(dec!(15.01))));
        assert!(!b.contains(None));
    }

    #[test]
    fn test_inactive_bound_accepts_null() {
        assert!(Bound::default().contains(None));
    }

    #[test]
    fn test_parse_compact_bounds() {
        let b = Bound::parse_compact("100M", "10B");
        assert_eq!(b.min, Some(dec!(100_000_000)));
        assert_eq!(b.max, Some(dec!(10_000_000_000)));
        assert_eq!(Bound::parse_compact("", "abc"), Bound::default());
    }

    #[test]
    fn test_spec_deserializes_with_defaults() {
        let spec: FilterSpec =
            serde_json::from_str(r#"{"ranges": {"PE Ratio": {"max": 15}}}"#).unwrap();
        assert_eq!(spec.ranges["PE Ratio"], Bound::at_most(dec!(15)));
        assert!(spec.memberships.is_empty());
        assert!(spec.search.is_none());
    }

    #[test]
    fn test_is_empty_ignores_inactive_entries() {
        let spec = FilterSpec::new()
            .range("PE Ratio", None, None)
            .member("Sector", Vec::<String>::new())
            .search("   ");
        assert!(spec.is_empty());
        assert!(!FilterSpec::new().min("ROE", dec!(10)).is_empty());
    }

    #[test]
    fn test_ignored_columns_reports_unusable_types() {
        use chrono::NaiveDate;
        let table = Table::from_columns([
            ("Symbol", Column::texts([Some("AAA")])),
            ("ROE", Column::numbers([Some(dec!(12))])),
            ("P/FCF", Column::texts([Some("Loss")])),
            ("IPO Date", Column::Date(vec![NaiveDate::from_ymd_opt(2001, 5, 4)])),
        ])
        .unwrap();
        let spec = FilterSpec::new()
            .min("ROE", dec!(10))
            .max("P/FCF", dec!(10))
            .min("IPO Date", dec!(1))
            .max("Missing", dec!(1))
            .member("ROE", ["12"])
            .member("Symbol", ["AAA"]);
        assert_eq!(
            spec.ignored_columns(&table),
            vec!["IPO Date".to_string(), "Missing".to_string(), "ROE".to_string()]
        );
    }

    #[test]
    fn test_merge_overrides() {
        let base = FilterSpec::new().min("ROE", dec!(10)).max("PE Ratio", dec!(20));
        let merged = base.merge(&FilterSpec::new().min("ROE", dec!(20)));
        assert_eq!(merged.ranges["ROE"], Bound::at_least(dec!(20)));
        assert_eq!(merged.ranges["PE Ratio"], Bound::at_most(dec!(20)));
    }
}
