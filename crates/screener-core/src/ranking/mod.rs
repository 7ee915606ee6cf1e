//! Percentile ranks of selected columns, globally or within a group.
//!
//! Ranks are relative to the table they were computed on. A filtered subset
//! keeps the ranks of the full universe; they are not recomputed and need
//! not be self-consistent within the subset.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::{Column, Table};
use crate::ScreenerResult;

/// One percentile-rank output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSpec {
    pub column: String,
    pub group_by: Option<String>,
}

impl RankSpec {
    pub fn global(column: &str) -> Self {
        Self {
            column: column.to_string(),
            group_by: None,
        }
    }

    pub fn within(column: &str, group: &str) -> Self {
        Self {
            column: column.to_string(),
            group_by: Some(group.to_string()),
        }
    }

    /// `<column>_<scope>_Rank`, scope being the group column or `Global`.
    pub fn output_name(&self) -> String {
        let scope = self.group_by.as_deref().unwrap_or("Global");
        format!("{}_{}_Rank", self.column, scope)
    }
}

pub fn default_specs() -> Vec<RankSpec> {
    vec![
        RankSpec::within("Master_Score", "Sector"),
        RankSpec::global("Master_Score"),
        RankSpec::global("Ultra_Score"),
        RankSpec::within("PE Ratio", "Sector"),
        RankSpec::within("ROE", "Sector"),
        RankSpec::within("Rev. Growth", "Sector"),
        RankSpec::within("Market Cap", "Industry"),
    ]
}

/// Average-rank percentile (0-100] of each non-null value in `values`.
pub fn percentile_ranks(values: &[Option<Decimal>]) -> Vec<Option<Decimal>> {
    let mut present: Vec<(usize, Decimal)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    present.sort_by(|a, b| a.1.cmp(&b.1));

    let n = Decimal::from(present.len());
    let mut out = vec![None; values.len()];
    let mut start = 0;
    while start < present.len() {
        let mut end = start;
        while end + 1 < present.len() && present[end + 1].1 == present[start].1 {
            end += 1;
        }
        // 1-based ranks start+1..=end+1, averaged across the tie
        let avg_rank = Decimal::from(start + end + 2) / dec!(2);
        let pct = avg_rank / n * dec!(100);
        for &(idx, _) in &present[start..=end] {
            out[idx] = Some(pct);
        }
        start = end + 1;
    }
    out
}

fn grouped_ranks(values: &[Option<Decimal>], groups: &[Option<String>]) -> Vec<Option<Decimal>> {
    let mut members: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, g) in groups.iter().enumerate() {
        if let Some(g) = g.as_deref() {
            members.entry(g).or_default().push(i);
        }
    }

    let mut out = vec![None; values.len()];
    for rows in members.values() {
        let slice: Vec<Option<Decimal>> = rows.iter().map(|&i| values[i]).collect();
        for (&row, rank) in rows.iter().zip(percentile_ranks(&slice)) {
            out[row] = rank;
        }
    }
    out
}

/// Append one rank column per spec. Specs over absent columns are skipped.
pub fn add_ranks(table: &Table, specs: &[RankSpec]) -> ScreenerResult<Table> {
    let mut out = table.clone();
    for spec in specs {
        let Some(values) = table.numbers(&spec.column) else {
            debug!(column = %spec.column, "rank skipped: column absent or not numeric");
            continue;
        };
        let ranks = match &spec.group_by {
            None => percentile_ranks(values),
            Some(group) => match table.texts(group) {
                Some(groups) => grouped_ranks(values, groups),
                None => {
                    debug!(column = %spec.column, group = %group, "rank skipped: group column absent");
                    continue;
                }
            },
        };
        out.insert_column(spec.output_name(), Column::Number(ranks))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_ranks_average_ties() {
        let values = vec![Some(dec!(10)), Some(dec!(20)), Some(dec!(20)), Some(dec!(30))];
        let ranks = percentile_ranks(&values);
        assert_eq!(
            ranks,
            vec![Some(dec!(25)), Some(dec!(62.5)), Some(dec!(62.5)), Some(dec!(100))]
        );
    }

    #[test]
    fn test_nulls_get_no_rank() {
        let ranks = percentile_ranks(&[None, Some(dec!(5)), Some(dec!(1))]);
        assert_eq!(ranks, vec![None, Some(dec!(100)), Some(dec!(50))]);
    }

    #[test]
    fn test_grouped_ranks_are_independent() {
        let table = Table::from_columns([
            (
                "Sector",
                Column::texts([Some("Tech"), Some("Tech"), Some("Energy"), None]),
            ),
            (
                "ROE",
                Column::numbers([Some(dec!(10)), Some(dec!(20)), Some(dec!(1)), Some(dec!(99))]),
            ),
        ])
        .unwrap();
        let out = add_ranks(&table, &[RankSpec::within("ROE", "Sector")]).unwrap();
        let ranks = out.numbers("ROE_Sector_Rank").unwrap();
        assert_eq!(
            ranks,
            &[Some(dec!(50)), Some(dec!(100)), Some(dec!(100)), None]
        );
    }

    #[test]
    fn test_absent_columns_skipped() {
        let table = Table::from_columns([("ROE", Column::numbers([Some(dec!(1))]))]).unwrap();
        let out = add_ranks(
            &table,
            &[RankSpec::global("Missing"), RankSpec::within("ROE", "Sector")],
        )
        .unwrap();
        assert_eq!(out.num_columns(), 1);
    }

    #[test]
    fn test_output_name() {
        assert_eq!(RankSpec::global("ROE").output_name(), "ROE_Global_Rank");
        assert_eq!(
            RankSpec::within("PE Ratio", "Sector").output_name(),
            "PE Ratio_Sector_Rank"
        );
    }
}
