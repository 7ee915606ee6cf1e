//! Composite scoring engine.
//!
//! Scoring runs in two steps so quantile cutoffs are frozen explicitly:
//! 1. [`ScoringModel::calibrate`] resolves every criterion against the full
//!    universe, turning quantile thresholds into fixed numbers and marking
//!    criteria over absent or all-null columns as inactive.
//! 2. [`Calibration::apply`] scores any table with those fixed cutoffs.
//!
//! Scores are always defined: inactive criteria and null cells contribute 0.

pub mod criteria;
pub mod model;

pub use criteria::{quantile, Criterion, Threshold};
pub use model::{
    MasterScore, ScoreBand, ScoringModel, SubScore, MASTER_SCORE, MASTER_SCORES, SUB_SCORES,
    ULTRA_SCORE,
};

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::table::{Column, Table};
use crate::ScreenerResult;

/// A criterion after calibration.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCriterion {
    pub sub_score: &'static str,
    pub column: &'static str,
    pub points: Decimal,
    /// Threshold as declared in the model.
    pub declared: Threshold,
    /// Fixed threshold used for scoring; `None` when the criterion is inactive.
    pub resolved: Option<Threshold>,
}

impl ResolvedCriterion {
    pub fn is_active(&self) -> bool {
        self.resolved.is_some()
    }

    fn award(&self, value: Option<Decimal>) -> Decimal {
        match (self.resolved, value) {
            (Some(t), Some(v)) if t.passes(v) => self.points,
            _ => Decimal::ZERO,
        }
    }
}

/// Frozen scoring thresholds derived once from the scoring universe.
#[derive(Debug, Clone, Serialize)]
pub struct Calibration {
    pub universe_rows: usize,
    pub criteria: Vec<ResolvedCriterion>,
    #[serde(skip)]
    model: ScoringModel,
}

impl ScoringModel {
    /// Resolve every criterion against `universe`.
    pub fn calibrate(&self, universe: &Table) -> ScreenerResult<Calibration> {
        for master in &self.master_scores {
            master.validate()?;
        }

        let mut criteria = Vec::new();
        for sub in &self.sub_scores {
            for c in sub.criteria {
                let resolved = universe
                    .numbers(c.column)
                    .and_then(|values| c.threshold.resolve(values));
                if resolved.is_none() {
                    debug!(
                        sub_score = sub.name,
                        column = c.column,
                        "criterion inactive: column absent or empty"
                    );
                }
                criteria.push(ResolvedCriterion {
                    sub_score: sub.name,
                    column: c.column,
                    points: c.points,
                    declared: c.threshold,
                    resolved,
                });
            }
        }

        Ok(Calibration {
            universe_rows: universe.num_rows(),
            criteria,
            model: self.clone(),
        })
    }
}

impl Calibration {
    pub fn active_criteria(&self) -> usize {
        self.criteria.iter().filter(|c| c.is_active()).count()
    }

    /// Append every sub-score and master-score column to a copy of `table`.
    /// Rows are neither dropped nor reordered.
    pub fn apply(&self, table: &Table) -> ScreenerResult<Table> {
        let rows = table.num_rows();
        let mut scores: HashMap<&'static str, Vec<Decimal>> = HashMap::new();

        for sub in &self.model.sub_scores {
            let mut totals = vec![Decimal::ZERO; rows];
            for c in self.criteria.iter().filter(|c| c.sub_score == sub.name) {
                if !c.is_active() {
                    continue;
                }
                let Some(values) = table.numbers(c.column) else {
                    continue;
                };
                for (total, value) in totals.iter_mut().zip(values) {
                    *total += c.award(*value);
                }
            }
            scores.insert(sub.name, totals);
        }

        for master in &self.model.master_scores {
            let combined: Vec<Decimal> = (0..rows)
                .map(|row| {
                    master.combine(|name| {
                        scores
                            .get(name)
                            .map(|v| v[row])
                            .unwrap_or(Decimal::ZERO)
                    })
                })
                .collect();
            scores.insert(master.name, combined);
        }

        let mut out = table.clone();
        for name in self.model.output_columns() {
            if let Some(values) = scores.remove(name) {
                out.insert_column(name, Column::numbers(values.into_iter().map(Some)))?;
            }
        }
        Ok(out)
    }
}

/// Calibrate the default model on `table` and score it in one call.
pub fn score_table(table: &Table) -> ScreenerResult<(Table, Calibration)> {
    let calibration = ScoringModel::default().calibrate(table)?;
    let scored = calibration.apply(table)?;
    Ok((scored, calibration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn numbers(values: &[Option<i64>]) -> Column {
        Column::numbers(values.iter().map(|v| v.map(Decimal::from)))
    }

    #[test]
    fn test_scores_defined_with_no_inputs() {
        let table = Table::from_columns([(
            "Symbol",
            Column::texts([Some("AAA"), Some("BBB")]),
        )])
        .unwrap();
        let (scored, cal) = score_table(&table).unwrap();
        assert_eq!(cal.active_criteria(), 0);
        for name in ScoringModel::default().output_columns() {
            let col = scored.numbers(name).unwrap();
            assert!(col.iter().all(|v| *v == Some(Decimal::ZERO)), "{name}");
        }
    }

    #[test]
    fn test_growth_fixed_thresholds() {
        let table = Table::from_columns([
            ("Rev. Growth", numbers(&[Some(25), Some(10), None])),
            ("EPS Growth", numbers(&[Some(30), Some(30), Some(30)])),
        ])
        .unwrap();
        let (scored, _) = score_table(&table).unwrap();
        let growth = scored.numbers(model::GROWTH_SCORE).unwrap();
        assert_eq!(growth, &[Some(dec!(50)), Some(dec!(25)), Some(dec!(25))]);
    }

    #[test]
    fn test_quality_uses_universe_quantile() {
        let table = Table::from_columns([(
            "ROE",
            numbers(&[Some(1), Some(2), Some(3), Some(4), Some(5)]),
        )])
        .unwrap();
        let (scored, cal) = score_table(&table).unwrap();
        // q70 = 3.8, only 4 and 5 exceed it
        let quality = scored.numbers(model::QUALITY_SCORE).unwrap();
        assert_eq!(
            quality,
            &[
                Some(dec!(0)),
                Some(dec!(0)),
                Some(dec!(0)),
                Some(dec!(25)),
                Some(dec!(25))
            ]
        );
        let roe = cal.criteria.iter().find(|c| c.column == "ROE").unwrap();
        assert_eq!(roe.resolved, Some(Threshold::Above(dec!(3.8))));
    }

    #[test]
    fn test_calibration_frozen_for_subsets() {
        let table = Table::from_columns([(
            "ROE",
            numbers(&[Some(1), Some(2), Some(3), Some(4), Some(5)]),
        )])
        .unwrap();
        let cal = ScoringModel::default().calibrate(&table).unwrap();
        // Rescoring the bottom two rows alone keeps the universe cutoff.
        let subset = table.take(&[3, 4]);
        let rescored = cal.apply(&subset).unwrap();
        assert_eq!(
            rescored.numbers(model::QUALITY_SCORE).unwrap(),
            &[Some(dec!(25)), Some(dec!(25))]
        );
    }

    #[test]
    fn test_master_score_weighting() {
        let table = Table::from_columns([
            ("Rev. Growth", numbers(&[Some(50)])),
            ("EPS Growth", numbers(&[Some(50)])),
            ("Rev Gr. Next Y", numbers(&[Some(50)])),
            ("EPS Gr. Next Y", numbers(&[Some(50)])),
        ])
        .unwrap();
        let (scored, _) = score_table(&table).unwrap();
        assert_eq!(scored.number_at(model::GROWTH_SCORE, 0), Some(dec!(100)));
        assert_eq!(scored.number_at(MASTER_SCORE, 0), Some(dec!(20)));
    }

    #[test]
    fn test_apply_preserves_input_columns() {
        let table = Table::from_columns([
            ("Symbol", Column::texts([Some("AAA")])),
            ("PE Ratio", numbers(&[Some(8)])),
        ])
        .unwrap();
        let (scored, _) = score_table(&table).unwrap();
        assert_eq!(&scored.column_names()[..2], &["Symbol", "PE Ratio"]);
        assert_eq!(scored.num_rows(), 1);
        assert_eq!(
            scored.num_columns(),
            2 + ScoringModel::default().output_columns().len()
        );
    }
}
