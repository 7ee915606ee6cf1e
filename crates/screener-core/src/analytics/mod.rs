//! Summaries over a filtered table: headline metrics, leaderboards and the
//! per-sector breakdown.
//!
//! All functions are pure reductions. A statistic over an absent or empty
//! column is `None`, never an error.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::filters::{COMPANY_NAME, SYMBOL};
use crate::scoring::{quantile, ScoreBand, MASTER_SCORE};
use crate::table::Table;
use crate::types::{Percent, Score};

const MARKET_CAP: &str = "Market Cap";
const PE_RATIO: &str = "PE Ratio";
const ROE: &str = "ROE";
const REV_GROWTH: &str = "Rev. Growth";
const DIV_YIELD: &str = "Div. Yield";
const PAYOUT_RATIO: &str = "Payout Ratio";
const SECTOR: &str = "Sector";

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

fn gather(values: &[Option<Decimal>], rows: &[usize]) -> Vec<Option<Decimal>> {
    rows.iter().map(|&r| values[r]).collect()
}

pub fn median(values: &[Option<Decimal>]) -> Option<Decimal> {
    quantile(values, dec!(0.5))
}

/// `None` when there are no values or the total overflows.
pub fn mean(values: &[Option<Decimal>]) -> Option<Decimal> {
    let n = values.iter().flatten().count();
    if n == 0 {
        return None;
    }
    sum(values)?.checked_div(Decimal::from(n))
}

fn sum(values: &[Option<Decimal>]) -> Option<Decimal> {
    values
        .iter()
        .flatten()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
}

fn column_stat(
    table: &Table,
    column: &str,
    rows: &[usize],
    stat: fn(&[Option<Decimal>]) -> Option<Decimal>,
) -> Option<Decimal> {
    let values = table.numbers(column)?;
    stat(&gather(values, rows))
}

fn column_sum(table: &Table, column: &str, rows: &[usize]) -> Option<Decimal> {
    let values = table.numbers(column)?;
    sum(&gather(values, rows))
}

/// Descending by value, nulls last; ties keep table order.
fn descending(values: &[Option<Decimal>]) -> Vec<usize> {
    let mut rows: Vec<usize> = (0..values.len()).collect();
    rows.sort_by(|&a, &b| match (values[a], values[b]) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

// ---------------------------------------------------------------------------
// Headline summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenSummary {
    pub count: usize,
    /// Share of the universe that passed, in percent.
    pub share_pct: Percent,
    pub total_market_cap: Option<Decimal>,
    pub median_pe: Option<Decimal>,
    pub mean_div_yield: Option<Decimal>,
    pub median_roe: Option<Decimal>,
    pub mean_master_score: Option<Decimal>,
    pub top_pick: Option<String>,
}

pub fn summarize(filtered: &Table, total_rows: usize) -> ScreenSummary {
    let rows: Vec<usize> = (0..filtered.num_rows()).collect();
    let count = rows.len();
    let share_pct = if total_rows == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(count) * Decimal::ONE_HUNDRED / Decimal::from(total_rows)
    };
    let top_pick = top_n(filtered, MASTER_SCORE, 1)
        .into_iter()
        .find(|r| r.score.is_some())
        .and_then(|r| r.symbol);

    ScreenSummary {
        count,
        share_pct,
        total_market_cap: column_sum(filtered, MARKET_CAP, &rows),
        median_pe: column_stat(filtered, PE_RATIO, &rows, median),
        mean_div_yield: column_stat(filtered, DIV_YIELD, &rows, mean),
        median_roe: column_stat(filtered, ROE, &rows, median),
        mean_master_score: column_stat(filtered, MASTER_SCORE, &rows, mean),
        top_pick,
    }
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub symbol: Option<String>,
    pub company: Option<String>,
    pub score: Option<Score>,
    pub band: Option<ScoreBand>,
}

/// The `n` rows with the highest `score_column`, nulls last.
/// Empty when the column is absent.
pub fn top_n(table: &Table, score_column: &str, n: usize) -> Vec<RankedRow> {
    let Some(scores) = table.numbers(score_column) else {
        return Vec::new();
    };
    descending(scores)
        .into_iter()
        .take(n)
        .map(|row| RankedRow {
            symbol: table.text_at(SYMBOL, row).map(str::to_string),
            company: table.text_at(COMPANY_NAME, row).map(str::to_string),
            score: scores[row],
            band: scores[row].map(ScoreBand::classify),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendRow {
    pub symbol: Option<String>,
    pub company: Option<String>,
    pub div_yield: Decimal,
    pub payout_ratio: Option<Decimal>,
}

/// Highest-yielding dividend payers (yield > 0).
pub fn top_dividend(table: &Table, n: usize) -> Vec<DividendRow> {
    let Some(yields) = table.numbers(DIV_YIELD) else {
        return Vec::new();
    };
    descending(yields)
        .into_iter()
        .filter_map(|row| {
            let div_yield = yields[row].filter(|y| *y > Decimal::ZERO)?;
            Some(DividendRow {
                symbol: table.text_at(SYMBOL, row).map(str::to_string),
                company: table.text_at(COMPANY_NAME, row).map(str::to_string),
                div_yield,
                payout_ratio: table.number_at(PAYOUT_RATIO, row),
            })
        })
        .take(n)
        .collect()
}

// ---------------------------------------------------------------------------
// Sector breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorStats {
    pub sector: String,
    pub count: usize,
    pub total_market_cap: Option<Decimal>,
    pub median_pe: Option<Decimal>,
    pub median_roe: Option<Decimal>,
    pub median_rev_growth: Option<Decimal>,
    pub mean_div_yield: Option<Decimal>,
    pub mean_master_score: Option<Decimal>,
}

/// Per-sector statistics, largest sectors first. Rows without a sector are
/// left out. Empty when the table has no `Sector` column.
pub fn sector_summary(table: &Table) -> Vec<SectorStats> {
    let Some(sectors) = table.texts(SECTOR) else {
        return Vec::new();
    };
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, sector) in sectors.iter().enumerate() {
        if let Some(s) = sector.as_deref() {
            groups.entry(s).or_default().push(row);
        }
    }

    let mut out: Vec<SectorStats> = groups
        .into_iter()
        .map(|(sector, rows)| SectorStats {
            sector: sector.to_string(),
            count: rows.len(),
            total_market_cap: column_sum(table, MARKET_CAP, &rows),
            median_pe: column_stat(table, PE_RATIO, &rows, median),
            median_roe: column_stat(table, ROE, &rows, median),
            median_rev_growth: column_stat(table, REV_GROWTH, &rows, median),
            mean_div_yield: column_stat(table, DIV_YIELD, &rows, mean),
            mean_master_score: column_stat(table, MASTER_SCORE, &rows, mean),
        })
        .collect();
    // stable: equal counts stay alphabetical
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
