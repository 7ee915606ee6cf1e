//! Filter pipeline: reduce a scored table to the rows satisfying every active
//! predicate.
//!
//! Properties relied on by callers:
//! - the result is a row subset of the input with identical columns,
//! - an empty spec returns the input unchanged,
//! - predicates over absent columns are skipped without error,
//! - a range over a text column is applied to its parseable cells,
//! - a null or unparseable cell never satisfies an active bound,
//! - nothing is cached between calls; every call filters from scratch.

pub mod presets;
pub mod spec;

pub use presets::{Preset, PresetLibrary};
pub use spec::{Bound, FilterSpec, COMPANY_NAME, SYMBOL};

use std::borrow::Cow;
use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::debug;

use crate::loader::parse_cell;
use crate::table::{Column, Table};

/// A single row predicate over one or two columns.
enum Predicate<'a> {
    Member {
        cells: &'a [Option<String>],
        allowed: &'a BTreeSet<String>,
    },
    ContainsAll {
        cells: &'a [Option<String>],
        tokens: &'a [String],
    },
    Search {
        symbols: Option<&'a [Option<String>]>,
        names: Option<&'a [Option<String>]>,
        upper: String,
        lower: String,
    },
    Range {
        cells: Cow<'a, [Option<Decimal>]>,
        bound: Bound,
    },
}

impl Predicate<'_> {
    fn keep(&self, row: usize) -> bool {
        match self {
            Predicate::Member { cells, allowed } => cells[row]
                .as_ref()
                .is_some_and(|v| allowed.contains(v)),
            Predicate::ContainsAll { cells, tokens } => cells[row]
                .as_deref()
                .is_some_and(|v| tokens.iter().all(|t| v.contains(t.as_str()))),
            Predicate::Search {
                symbols,
                names,
                upper,
                lower,
            } => {
                let by_symbol = symbols
                    .and_then(|s| s[row].as_deref())
                    .is_some_and(|s| s.contains(upper.as_str()));
                let by_name = names
                    .and_then(|n| n[row].as_deref())
                    .is_some_and(|n| n.to_lowercase().contains(lower.as_str()));
                by_symbol || by_name
            }
            Predicate::Range { cells, bound } => bound.contains(cells[row]),
        }
    }
}

fn text_cells<'a>(table: &'a Table, column: &str) -> Option<&'a [Option<String>]> {
    match table.column(column) {
        Some(Column::Text(cells)) => Some(cells),
        Some(other) => {
            debug!(column, kind = other.kind(), "categorical filter on non-text column skipped");
            None
        }
        None => {
            debug!(column, "filter skipped: column absent");
            None
        }
    }
}

/// Numeric view of a column for a range bound. Text columns are coerced
/// cell by cell; cells that do not parse become null and fail the bound.
fn range_cells<'a>(table: &'a Table, column: &str) -> Option<Cow<'a, [Option<Decimal>]>> {
    match table.column(column) {
        Some(Column::Number(cells)) => Some(Cow::Borrowed(cells.as_slice())),
        Some(Column::Text(cells)) => {
            debug!(column, "range filter on text column: parsing cells");
            Some(Cow::Owned(
                cells
                    .iter()
                    .map(|c| c.as_deref().and_then(parse_cell))
                    .collect(),
            ))
        }
        Some(other) => {
            debug!(column, kind = other.kind(), "range filter on non-numeric column skipped");
            None
        }
        None => {
            debug!(column, "range filter skipped: column absent");
            None
        }
    }
}

/// Build predicates, categorical (cheap, usually selective) first.
fn predicates<'a>(table: &'a Table, spec: &'a FilterSpec) -> Vec<Predicate<'a>> {
    let mut preds = Vec::new();

    for (column, allowed) in &spec.memberships {
        if allowed.is_empty() {
            continue;
        }
        if let Some(cells) = text_cells(table, column) {
            preds.push(Predicate::Member { cells, allowed });
        }
    }

    for (column, tokens) in &spec.contains_all {
        if tokens.is_empty() {
            continue;
        }
        if let Some(cells) = text_cells(table, column) {
            preds.push(Predicate::ContainsAll { cells, tokens });
        }
    }

    if let Some(term) = spec.search_term() {
        let symbols = table.texts(SYMBOL);
        let names = table.texts(COMPANY_NAME);
        if symbols.is_some() || names.is_some() {
            preds.push(Predicate::Search {
                symbols,
                names,
                upper: term.to_uppercase(),
                lower: term.to_lowercase(),
            });
        } else {
            debug!("search skipped: no symbol or name column");
        }
    }

    for (column, bound) in &spec.ranges {
        if !bound.is_active() {
            continue;
        }
        if let Some(cells) = range_cells(table, column) {
            preds.push(Predicate::Range {
                cells,
                bound: *bound,
            });
        }
    }

    preds
}

/// Row indices of `table` that satisfy every active predicate in `spec`.
pub fn matching_rows(table: &Table, spec: &FilterSpec) -> Vec<usize> {
    let preds = predicates(table, spec);
    let mut rows: Vec<usize> = (0..table.num_rows()).collect();
    for pred in &preds {
        rows.retain(|&row| pred.keep(row));
        if rows.is_empty() {
            break;
        }
    }
    rows
}

/// Apply `spec` to `table`, returning the surviving rows with all columns.
pub fn apply_filters(table: &Table, spec: &FilterSpec) -> Table {
    if spec.is_empty() {
        return table.clone();
    }
    let rows = matching_rows(table, spec);
    debug!(matched = rows.len(), total = table.num_rows(), "filters applied");
    table.take(&rows)
}
