pub mod presets;
pub mod rank;
pub mod score;
pub mod screen;
pub mod sectors;
pub mod thresholds;

use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use screener_core::filters::{FilterSpec, PresetLibrary};
use screener_core::loader::parse_compact;
use screener_core::universe::{Universe, UniverseCache};
use screener_core::with_metadata;

use crate::config::AppConfig;
use crate::input;

pub type CommandResult = Result<Value, Box<dyn std::error::Error>>;

/// Columns shown for row results unless `--columns` or `--all-columns`.
pub const DEFAULT_COLUMNS: [&str; 8] = [
    "Symbol",
    "Company Name",
    "Market Cap",
    "Master_Score",
    "PE Ratio",
    "ROE",
    "Rev. Growth",
    "Sector",
];

/// Per-invocation state shared by every command.
pub struct Session {
    pub config: AppConfig,
    pub data: Option<String>,
}

impl Session {
    pub fn universe(&self) -> Result<Arc<Universe>, Box<dyn std::error::Error>> {
        let path = self.config.data.resolve(self.data.as_deref())?;
        Ok(UniverseCache::new(path).get()?)
    }
}

/// Wrap a command result in the standard output envelope.
pub fn envelope<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    started: Instant,
    result: T,
) -> CommandResult {
    let elapsed_us = started.elapsed().as_micros() as u64;
    let output = with_metadata(methodology, assumptions, warnings, elapsed_us, result);
    Ok(serde_json::to_value(output)?)
}

/// `COLUMN=VALUE` with compact suffixes allowed in the value (`Market Cap=2B`).
pub fn parse_column_value(raw: &str) -> Result<(String, Decimal), String> {
    let (column, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", raw))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", raw));
    }
    let value = parse_compact(value).ok_or_else(|| format!("'{}' is not a number", value.trim()))?;
    Ok((column.to_string(), value))
}

/// Filter options shared by `screen`, `rank` and `sectors`.
///
/// Layers, later wins: preset, then `--filter` file (or piped JSON), then
/// the individual flags. Flags set one side of a bound and keep the other.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Named preset (id or display name, see `screener presets`)
    #[arg(long)]
    pub preset: Option<String>,

    /// JSON or YAML filter spec file
    #[arg(long)]
    pub filter: Option<String>,

    /// Preset library file to use instead of the built-in presets
    #[arg(long)]
    pub presets_file: Option<String>,

    /// Ticker or company name search
    #[arg(long)]
    pub search: Option<String>,

    /// Allowed sector (repeatable)
    #[arg(long = "sector", value_name = "SECTOR")]
    pub sectors: Vec<String>,

    /// Allowed exchange (repeatable)
    #[arg(long = "exchange", value_name = "EXCHANGE")]
    pub exchanges: Vec<String>,

    /// Allowed country (repeatable)
    #[arg(long = "country", value_name = "COUNTRY")]
    pub countries: Vec<String>,

    /// Required index membership, e.g. SP500 (repeatable)
    #[arg(long = "index", value_name = "INDEX")]
    pub indices: Vec<String>,

    /// Lower bound, e.g. --min "ROE=15" (repeatable)
    #[arg(long = "min", value_name = "COLUMN=VALUE", value_parser = parse_column_value)]
    pub mins: Vec<(String, Decimal)>,

    /// Upper bound, e.g. --max "PE Ratio=20" (repeatable)
    #[arg(long = "max", value_name = "COLUMN=VALUE", value_parser = parse_column_value)]
    pub maxs: Vec<(String, Decimal)>,

    /// Minimum market cap, e.g. 100M
    #[arg(long)]
    pub market_cap_min: Option<String>,

    /// Maximum market cap, e.g. 10B
    #[arg(long)]
    pub market_cap_max: Option<String>,
}

impl FilterArgs {
    pub fn library(&self) -> Result<PresetLibrary, Box<dyn std::error::Error>> {
        load_library(self.presets_file.as_deref())
    }

    pub fn build(&self) -> Result<FilterSpec, Box<dyn std::error::Error>> {
        let mut spec = match &self.preset {
            Some(key) => self.library()?.find(key)?.filter.clone(),
            None => FilterSpec::new(),
        };

        let document: Option<FilterSpec> = if let Some(ref path) = self.filter {
            Some(input::file::read_document(path)?)
        } else if let Some(data) = input::stdin::read_stdin()? {
            Some(serde_json::from_value(data)?)
        } else {
            None
        };
        if let Some(doc) = document {
            spec = spec.merge(&doc);
        }

        self.apply_flags(&mut spec)?;
        debug!(?spec, "filter spec assembled");
        Ok(spec)
    }

    fn apply_flags(&self, spec: &mut FilterSpec) -> Result<(), Box<dyn std::error::Error>> {
        for (column, value) in &self.mins {
            spec.ranges.entry(column.clone()).or_default().min = Some(*value);
        }
        for (column, value) in &self.maxs {
            spec.ranges.entry(column.clone()).or_default().max = Some(*value);
        }

        for (raw, is_min) in [(&self.market_cap_min, true), (&self.market_cap_max, false)] {
            let Some(raw) = raw else { continue };
            let value = parse_compact(raw)
                .ok_or_else(|| format!("invalid market cap '{}' (try 100M or 10B)", raw))?;
            let bound = spec.ranges.entry("Market Cap".to_string()).or_default();
            if is_min {
                bound.min = Some(value);
            } else {
                bound.max = Some(value);
            }
        }

        for (column, values) in [
            ("Sector", &self.sectors),
            ("Exchange", &self.exchanges),
            ("Country", &self.countries),
        ] {
            if !values.is_empty() {
                spec.memberships
                    .insert(column.to_string(), values.iter().cloned().collect());
            }
        }
        if !self.indices.is_empty() {
            spec.contains_all
                .insert("In Index".to_string(), self.indices.clone());
        }
        if let Some(term) = &self.search {
            spec.search = Some(term.clone());
        }
        Ok(())
    }
}

pub fn load_library(path: Option<&str>) -> Result<PresetLibrary, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(PresetLibrary::from_json(&input::file::read_text(p)?)?),
        None => Ok(PresetLibrary::builtin()?),
    }
}

/// Output column selection shared by row-returning commands.
#[derive(Args, Debug, Default)]
pub struct ViewArgs {
    /// Comma-separated columns to show
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Show every column
    #[arg(long, conflicts_with = "columns")]
    pub all_columns: bool,

    /// Numeric column to sort by (descending)
    #[arg(long, default_value = "Master_Score")]
    pub sort_by: String,

    /// Sort ascending instead
    #[arg(long)]
    pub ascending: bool,

    /// Maximum rows to return
    #[arg(long)]
    pub limit: Option<usize>,
}

impl ViewArgs {
    pub fn render(&self, table: &screener_core::table::Table, default: &[&str]) -> Vec<Value> {
        let mut view = table.sorted_by(&self.sort_by, !self.ascending);
        if let Some(n) = self.limit {
            view = view.head(n);
        }
        if !self.all_columns {
            view = if self.columns.is_empty() {
                view.select(default)
            } else {
                view.select(&self.columns)
            };
        }
        view.to_records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use screener_core::filters::Bound;

    #[test]
    fn test_parse_column_value() {
        assert_eq!(
            parse_column_value("PE Ratio=15").unwrap(),
            ("PE Ratio".to_string(), dec!(15))
        );
        assert_eq!(
            parse_column_value("Market Cap=2B").unwrap(),
            ("Market Cap".to_string(), dec!(2_000_000_000))
        );
        assert!(parse_column_value("ROE").is_err());
        assert!(parse_column_value("=5").is_err());
        assert!(parse_column_value("ROE=abc").is_err());
    }

    #[test]
    fn test_flags_set_one_side_of_preset_bound() {
        let args = FilterArgs {
            maxs: vec![("PE Ratio".to_string(), dec!(12))],
            sectors: vec!["Energy".to_string()],
            market_cap_min: Some("1B".to_string()),
            ..FilterArgs::default()
        };
        let mut spec = FilterSpec::new().range("PE Ratio", Some(dec!(0.1)), Some(dec!(10)));
        args.apply_flags(&mut spec).unwrap();
        assert_eq!(
            spec.ranges["PE Ratio"],
            Bound::new(Some(dec!(0.1)), Some(dec!(12)))
        );
        assert_eq!(
            spec.ranges["Market Cap"],
            Bound::at_least(dec!(1_000_000_000))
        );
        assert!(spec.memberships["Sector"].contains("Energy"));
    }

    #[test]
    fn test_bad_market_cap_is_an_error() {
        let args = FilterArgs {
            market_cap_max: Some("lots".to_string()),
            ..FilterArgs::default()
        };
        assert!(args.apply_flags(&mut FilterSpec::new()).is_err());
    }
}
