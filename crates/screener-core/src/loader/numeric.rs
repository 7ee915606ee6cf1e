//! Cell-level numeric coercion.
//!
//! Percent strings keep percentage-point units (`"12.5%"` parses to `12.5`),
//! because every threshold in the scoring model is expressed in points.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

const NULL_TOKENS: [&str; 8] = ["", "-", "N/A", "NA", "NaN", "nan", "None", "null"];

const THOUSAND: Decimal = dec!(1_000);
const MILLION: Decimal = dec!(1_000_000);
const BILLION: Decimal = dec!(1_000_000_000);
const TRILLION: Decimal = dec!(1_000_000_000_000);

pub fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw.trim())
}

fn suffix_multiplier(c: char) -> Option<Decimal> {
    match c.to_ascii_uppercase() {
        'K' => Some(THOUSAND),
        'M' => Some(MILLION),
        'B' => Some(BILLION),
        'T' => Some(TRILLION),
        _ => None,
    }
}

fn parse_plain(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse a compact magnitude such as `"150M"`, `"1.5b"` or `"2,300"`.
pub fn parse_compact(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let last = cleaned.chars().last()?;
    match suffix_multiplier(last) {
        Some(mult) => {
            let body = &cleaned[..cleaned.len() - last.len_utf8()];
            // Out-of-range magnitudes are unparseable, not fatal.
            parse_plain(body.trim()).and_then(|v| v.checked_mul(mult))
        }
        None => parse_plain(&cleaned),
    }
}

/// Parse a raw CSV cell into a number, or `None` if it is a null token or
/// cannot be read as one.
pub fn parse_cell(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if is_null_token(trimmed) {
        return None;
    }
    match trimmed.strip_suffix('%') {
        Some(body) => {
            let body: String = body.chars().filter(|c| *c != ',').collect();
            parse_plain(body.trim())
        }
        None => parse_compact(trimmed),
    }
}

/// Render a value as `$1.50B` / `12.00K` style text.
pub fn format_compact(value: Option<Decimal>, prefix: &str, decimals: u32) -> String {
    let Some(v) = value else {
        return "N/A".to_string();
    };
    let (scaled, suffix) = if v.abs() >= TRILLION {
        (v / TRILLION, "T")
    } else if v.abs() >= BILLION {
        (v / BILLION, "B")
    } else if v.abs() >= MILLION {
        (v / MILLION, "M")
    } else if v.abs() >= THOUSAND {
        (v / THOUSAND, "K")
    } else {
        (v, "")
    };
    let rounded =
        scaled.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{prefix}{rounded:.prec$}{suffix}", prec = decimals as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_stays_in_points() {
        assert_eq!(parse_cell("12.5%"), Some(dec!(12.5)));
        assert_eq!(parse_cell("-3.25%"), Some(dec!(-3.25)));
    }

    #[test]
    fn test_compact_suffixes() {
        assert_eq!(parse_compact("100M"), Some(dec!(100_000_000)));
        assert_eq!(parse_compact("1.5b"), Some(dec!(1_500_000_000)));
        assert_eq!(parse_compact("2T"), Some(dec!(2_000_000_000_000)));
        assert_eq!(parse_compact("$2,300"), Some(dec!(2300)));
    }

    #[test]
    fn test_null_tokens_and_garbage() {
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell(" - "), None);
        assert_eq!(parse_cell("N/A"), None);
        assert_eq!(parse_cell("Technology"), None);
        assert_eq!(parse_compact("M"), None);
    }

    #[test]
    fn test_overflowing_magnitude_is_null() {
        assert_eq!(parse_cell("9999999999999999999999999999T"), None);
        assert_eq!(parse_compact("1e20T"), None);
        assert_eq!(parse_compact("79228162514264337593543950335"), Some(Decimal::MAX));
    }

    #[test]
    fn test_plain_and_scientific() {
        assert_eq!(parse_cell("42"), Some(dec!(42)));
        assert_eq!(parse_cell("1e3"), Some(dec!(1000)));
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(Some(dec!(1_500_000_000)), "$", 2), "$1.50B");
        assert_eq!(format_compact(Some(dec!(-2500)), "", 1), "-2.5K");
        assert_eq!(format_compact(Some(dec!(12.345)), "", 2), "12.35");
        assert_eq!(format_compact(None, "$", 2), "N/A");
    }
}
