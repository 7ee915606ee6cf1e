//! CSV loader with numeric coercion.
//!
//! Produces the typed table the scoring and filter modules consume:
//! - identity/category columns stay text,
//! - known date columns become `NaiveDate`,
//! - any other column is numeric when most of its non-null cells parse,
//!   with unparseable cells turned into nulls.
//!
//! Repeated header names get `.1`, `.2`, ... suffixes in file order.
//! A missing source file is the only fatal condition.

pub mod numeric;

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ScreenerError;
use crate::table::{Column, Table};
use crate::ScreenerResult;

pub use numeric::{format_compact, parse_cell, parse_compact};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y"];

/// Column typing rules for a load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub text_columns: Vec<String>,
    pub date_columns: Vec<String>,
    /// Share of non-null cells that must parse for a column to be numeric.
    pub numeric_majority: Decimal,
}

impl Default for LoadOptions {
    fn default() -> Self {
        let text = [
            "Symbol",
            "Company Name",
            "Sector",
            "Industry",
            "Country",
            "Exchange",
            "In Index",
        ];
        let dates = [
            "IPO Date",
            "Ex-Div Date",
            "Payment Date",
            "Earnings Date",
            "Last Report Date",
            "Next Earnings",
            "Last Earnings",
        ];
        Self {
            text_columns: text.iter().map(|s| s.to_string()).collect(),
            date_columns: dates.iter().map(|s| s.to_string()).collect(),
            numeric_majority: dec!(0.5),
        }
    }
}

/// Load a CSV file from disk.
pub fn load_csv(path: impl AsRef<Path>, options: &LoadOptions) -> ScreenerResult<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScreenerError::SourceNotFound {
            path: path.display().to_string(),
        },
        _ => ScreenerError::Io(format!("{}: {}", path.display(), e)),
    })?;
    let start = Instant::now();
    let table = read_csv(file, options)?;
    info!(
        path = %path.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded screener source"
    );
    Ok(table)
}

/// Read CSV data with a header row from any reader.
pub fn read_csv<R: Read>(reader: R, options: &LoadOptions) -> ScreenerResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = unique_headers(rdr.headers()?.iter().map(|h| h.trim().to_string()));
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for record in rdr.records() {
        let record = record?;
        for (i, cells) in raw.iter_mut().enumerate() {
            let cell = record
                .get(i)
                .filter(|c| !numeric::is_null_token(c))
                .map(|c| c.trim().to_string());
            cells.push(cell);
        }
    }

    let mut table = Table::new();
    for (name, cells) in headers.into_iter().zip(raw) {
        let column = coerce_column(&name, cells, options);
        debug!(column = %name, kind = column.kind(), "typed column");
        table.insert_column(name, column)?;
    }
    Ok(table)
}

/// `Price, Price, Price` becomes `Price, Price.1, Price.2`, skipping any
/// suffix the file already uses.
fn unique_headers(names: impl Iterator<Item = String>) -> Vec<String> {
    let names: Vec<String> = names.collect();
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(names.len());
    for name in &names {
        if seen.insert(name.as_str()) {
            out.push(name.clone());
            continue;
        }
        let mut n = 1;
        let renamed = loop {
            let candidate = format!("{name}.{n}");
            if taken.insert(candidate.clone()) {
                break candidate;
            }
            n += 1;
        };
        warn!(column = %name, renamed = %renamed, "duplicate header renamed");
        out.push(renamed);
    }
    out
}

fn coerce_column(name: &str, cells: Vec<Option<String>>, options: &LoadOptions) -> Column {
    if options.text_columns.iter().any(|c| c == name) {
        return Column::Text(cells);
    }
    if options.date_columns.iter().any(|c| c == name) {
        return Column::Date(cells.iter().map(|c| c.as_deref().and_then(parse_date)).collect());
    }

    let parsed: Vec<Option<Decimal>> = cells
        .iter()
        .map(|c| c.as_deref().and_then(parse_cell))
        .collect();
    let present = cells.iter().filter(|c| c.is_some()).count();
    let numeric = parsed.iter().filter(|c| c.is_some()).count();

    // An all-null column stays numeric so scoring guards see it as empty.
    if present == 0 {
        return Column::Number(parsed);
    }
    if Decimal::from(numeric) > Decimal::from(present) * options.numeric_majority {
        Column::Number(parsed)
    } else {
        Column::Text(cells)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Symbol,Company Name,PE Ratio,ROE,Market Cap,IPO Date,Notes
AAPL,Apple Inc.,28.5,150.2%,3.4T,1980-12-12,great
MMM,3M Company,-,22%,60B,not a date,ok
T,AT&T Inc.,9.1,N/A,120B,,fine
";

    #[test]
    fn test_read_csv_types_columns() {
        let t = read_csv(CSV.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.text_at("Company Name", 1), Some("3M Company"));
        assert_eq!(t.text_at("Symbol", 2), Some("T"));
        assert_eq!(t.number_at("PE Ratio", 0), Some(dec!(28.5)));
        assert_eq!(t.number_at("PE Ratio", 1), None);
        assert_eq!(t.number_at("ROE", 0), Some(dec!(150.2)));
        assert_eq!(t.number_at("Market Cap", 1), Some(dec!(60_000_000_000)));
        assert!(matches!(t.column("Notes"), Some(Column::Text(_))));
    }

    #[test]
    fn test_overflowing_cell_loads_as_null() {
        let csv = "Symbol,Market Cap\nAAA,1e20T\nBBB,2B\nCCC,300M\n";
        let t = read_csv(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(t.number_at("Market Cap", 0), None);
        assert_eq!(t.number_at("Market Cap", 1), Some(dec!(2_000_000_000)));
    }

    #[test]
    fn test_duplicate_headers_are_suffixed() {
        let csv = "Symbol,Price,Price,Price.1,Price\nAAA,1,2,3,4\n";
        let t = read_csv(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(
            t.column_names(),
            vec!["Symbol", "Price", "Price.2", "Price.1", "Price.3"]
        );
        assert_eq!(t.number_at("Price", 0), Some(dec!(1)));
        assert_eq!(t.number_at("Price.2", 0), Some(dec!(2)));
        assert_eq!(t.number_at("Price.1", 0), Some(dec!(3)));
        assert_eq!(t.number_at("Price.3", 0), Some(dec!(4)));
    }

    #[test]
    fn test_unparseable_dates_become_null() {
        let t = read_csv(CSV.as_bytes(), &LoadOptions::default()).unwrap();
        let dates = t.dates("IPO Date").unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(1980, 12, 12));
        assert_eq!(dates[1], None);
        assert_eq!(dates[2], None);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_csv("/definitely/not/here.csv", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ScreenerError::SourceNotFound { .. }));
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date("09/18/2025"), NaiveDate::from_ymd_opt(2025, 9, 18));
        assert_eq!(parse_date("Sep 18, 2025"), NaiveDate::from_ymd_opt(2025, 9, 18));
        assert_eq!(
            parse_date("2025-09-18 00:00:00"),
            NaiveDate::from_ymd_opt(2025, 9, 18)
        );
    }
}
