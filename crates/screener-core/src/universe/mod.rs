//! The scored universe: load once, score once, filter many times.
//!
//! `Universe::build` runs the enrichment stages in order (scores, then
//! signals, then ranks) over the raw table and keeps the result immutable.
//! Every query filters that snapshot; nothing is rescored per query.

pub mod cache;

pub use cache::UniverseCache;

use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::filters::{apply_filters, FilterSpec};
use crate::scoring::{Calibration, ScoringModel};
use crate::table::Table;
use crate::types::Percent;
use crate::ScreenerResult;

#[cfg(feature = "ranking")]
use crate::ranking::{add_ranks, default_specs};
#[cfg(feature = "signals")]
use crate::signals::detect_signals;

#[derive(Debug, Clone)]
pub struct Universe {
    table: Table,
    calibration: Calibration,
}

/// Result of one query against the universe.
#[derive(Debug, Clone)]
pub struct Screen {
    pub table: Table,
    pub matched: usize,
    pub total: usize,
    /// Predicates skipped because their column is absent.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenCounts {
    pub matched: usize,
    pub total: usize,
    pub share_pct: Percent,
}

impl Screen {
    pub fn counts(&self) -> ScreenCounts {
        let share_pct = if self.total == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(self.matched) * Decimal::ONE_HUNDRED
                / Decimal::from(self.total)
        };
        ScreenCounts {
            matched: self.matched,
            total: self.total,
            share_pct,
        }
    }
}

impl Universe {
    /// Score the raw table with the default model.
    pub fn build(raw: Table) -> ScreenerResult<Self> {
        Self::build_with(raw, &ScoringModel::default())
    }

    pub fn build_with(raw: Table, model: &ScoringModel) -> ScreenerResult<Self> {
        let start = Instant::now();
        let calibration = model.calibrate(&raw)?;
        let table = calibration.apply(&raw)?;

        #[cfg(feature = "signals")]
        let table = detect_signals(&table)?;

        #[cfg(feature = "ranking")]
        let table = add_ranks(&table, &default_specs())?;

        info!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            active_criteria = calibration.active_criteria(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "universe built"
        );
        Ok(Self { table, calibration })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn len(&self) -> usize {
        self.table.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn screen(&self, spec: &FilterSpec) -> Screen {
        let warnings = spec
            .ignored_columns(&self.table)
            .into_iter()
            .map(|c| format!("filter on '{c}' ignored: column not in data or of the wrong type"))
            .collect();
        let table = apply_filters(&self.table, spec);
        Screen {
            matched: table.num_rows(),
            total: self.table.num_rows(),
            table,
            warnings,
        }
    }
}
