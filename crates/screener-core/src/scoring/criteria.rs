//! Point-awarding criteria and the quantile helper behind them.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Test applied to a single cell.
///
/// Quantile variants are resolved against the scoring universe before use;
/// see [`Threshold::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Threshold {
    Above(Decimal),
    Below(Decimal),
    /// Exclusive on both ends.
    Between(Decimal, Decimal),
    AboveQuantile(Decimal),
    BelowQuantile(Decimal),
    /// Positive and below the quantile (valuation multiples).
    PositiveBelowQuantile(Decimal),
}

impl Threshold {
    pub fn is_empirical(&self) -> bool {
        matches!(
            self,
            Threshold::AboveQuantile(_)
                | Threshold::BelowQuantile(_)
                | Threshold::PositiveBelowQuantile(_)
        )
    }

    /// Replace quantile thresholds with fixed cutoffs taken from `values`.
    /// Returns `None` when `values` holds no data.
    pub fn resolve(&self, values: &[Option<Decimal>]) -> Option<Threshold> {
        let resolved = match *self {
            Threshold::AboveQuantile(q) => Threshold::Above(quantile(values, q)?),
            Threshold::BelowQuantile(q) => Threshold::Below(quantile(values, q)?),
            Threshold::PositiveBelowQuantile(q) => {
                Threshold::Between(Decimal::ZERO, quantile(values, q)?)
            }
            fixed => {
                values.iter().flatten().next()?;
                fixed
            }
        };
        Some(resolved)
    }

    /// Evaluate a resolved threshold. Quantile variants never match.
    pub fn passes(&self, value: Decimal) -> bool {
        match *self {
            Threshold::Above(x) => value > x,
            Threshold::Below(x) => value < x,
            Threshold::Between(lo, hi) => value > lo && value < hi,
            _ => false,
        }
    }
}

fn percentile(q: Decimal) -> Decimal {
    (q * Decimal::ONE_HUNDRED).normalize()
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Threshold::Above(x) => write!(f, "> {}", x.normalize()),
            Threshold::Below(x) => write!(f, "< {}", x.normalize()),
            Threshold::Between(lo, hi) => write!(f, "> {} and < {}", lo.normalize(), hi.normalize()),
            Threshold::AboveQuantile(q) => write!(f, "> p{}", percentile(q)),
            Threshold::BelowQuantile(q) => write!(f, "< p{}", percentile(q)),
            Threshold::PositiveBelowQuantile(q) => write!(f, "> 0 and < p{}", percentile(q)),
        }
    }
}

/// One scoring criterion: `points` when `column` passes `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub column: &'static str,
    pub threshold: Threshold,
    pub points: Decimal,
}

/// Empirical quantile with linear interpolation between sorted non-null
/// values (position `q * (n - 1)`). `None` for an all-null slice.
pub fn quantile(values: &[Option<Decimal>], q: Decimal) -> Option<Decimal> {
    let mut sorted: Vec<Decimal> = values.iter().flatten().copied().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort();
    let q = q.max(Decimal::ZERO).min(Decimal::ONE);
    let pos = q * Decimal::from(sorted.len() - 1);
    let lower = pos.floor();
    let frac = pos - lower;
    let idx = lower.to_usize()?;
    let lo = sorted[idx];
    let hi = sorted.get(idx + 1).copied().unwrap_or(lo);
    // lo + (hi - lo) * frac, falling back to the lower value when the span
    // itself is not representable
    let step = hi
        .checked_sub(lo)
        .and_then(|span| span.checked_mul(frac))
        .unwrap_or(Decimal::ZERO);
    Some(lo.checked_add(step).unwrap_or(lo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empirical_variants() {
        assert!(Threshold::BelowQuantile(dec!(0.3)).is_empirical());
        assert!(Threshold::PositiveBelowQuantile(dec!(0.3)).is_empirical());
        assert!(!Threshold::Between(dec!(50), dec!(70)).is_empirical());
    }

    #[test]
    fn test_threshold_display() {
        assert_eq!(Threshold::AboveQuantile(dec!(0.7)).to_string(), "> p70");
        assert_eq!(Threshold::PositiveBelowQuantile(dec!(0.3)).to_string(), "> 0 and < p30");
        assert_eq!(Threshold::Between(dec!(50), dec!(70)).to_string(), "> 50 and < 70");
        assert_eq!(Threshold::Above(dec!(1.50)).to_string(), "> 1.5");
    }

    fn col(values: &[i64]) -> Vec<Option<Decimal>> {
        values.iter().map(|v| Some(Decimal::from(*v))).collect()
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        // 1..=5: q70 position 2.8 -> 3 + 0.8 * (4 - 3)
        let values = col(&[5, 1, 4, 2, 3]);
        assert_eq!(quantile(&values, dec!(0.7)), Some(dec!(3.8)));
        assert_eq!(quantile(&values, dec!(0.3)), Some(dec!(2.2)));
        assert_eq!(quantile(&values, dec!(1)), Some(dec!(5)));
        assert_eq!(quantile(&values, dec!(0)), Some(dec!(1)));
    }

    #[test]
    fn test_quantile_skips_nulls() {
        let values = vec![None, Some(dec!(10)), None];
        assert_eq!(quantile(&values, dec!(0.7)), Some(dec!(10)));
        assert_eq!(quantile(&[None, None], dec!(0.7)), None);
    }

    #[test]
    fn test_quantile_across_extreme_span() {
        let values = vec![Some(Decimal::MIN), Some(Decimal::MAX)];
        assert_eq!(quantile(&values, dec!(0.5)), Some(Decimal::MIN));
        assert_eq!(quantile(&values, dec!(1)), Some(Decimal::MAX));
    }

    #[test]
    fn test_resolve_quantile_to_fixed_cutoff() {
        let values = col(&[1, 2, 3, 4, 5]);
        let t = Threshold::PositiveBelowQuantile(dec!(0.3)).resolve(&values);
        assert_eq!(t, Some(Threshold::Between(Decimal::ZERO, dec!(2.2))));
    }

    #[test]
    fn test_resolve_fixed_requires_data() {
        assert_eq!(Threshold::Above(dec!(20)).resolve(&[None]), None);
        assert_eq!(
            Threshold::Above(dec!(20)).resolve(&[Some(dec!(1))]),
            Some(Threshold::Above(dec!(20)))
        );
    }

    #[test]
    fn test_between_is_exclusive() {
        let t = Threshold::Between(dec!(50), dec!(70));
        assert!(t.passes(dec!(60)));
        assert!(!t.passes(dec!(50)));
        assert!(!t.passes(dec!(70)));
    }

    #[test]
    fn test_degenerate_quantile_is_vacuous() {
        let values = col(&[7, 7, 7]);
        let above = Threshold::AboveQuantile(dec!(0.7)).resolve(&values).unwrap();
        assert!(!above.passes(dec!(7)));
    }
}
