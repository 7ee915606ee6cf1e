//! Opportunity and anomaly flags.
//!
//! Each flag is a conjunction of 2-4 inequality conditions over raw and
//! score columns. A flag is written as `100` when every condition holds and
//! `0` otherwise; a null cell fails its condition. When any referenced column
//! is absent or entirely null the flag is `0` for every row. Flags are
//! independent of one another.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::debug;

use crate::scoring::model::{MOMENTUM_SCORE, QUALITY_SCORE, VALUE_SCORE};
use crate::table::{Column, Table};
use crate::ScreenerResult;

pub const SIGNAL_COUNT: &str = "Signal_Count";

const FLAG_ON: Decimal = dec!(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Op {
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Condition {
    pub column: &'static str,
    pub op: Op,
    pub value: Decimal,
}

impl Condition {
    fn holds(&self, cell: Option<Decimal>) -> bool {
        let Some(v) = cell else {
            return false;
        };
        match self.op {
            Op::Gt => v > self.value,
            Op::Ge => v >= self.value,
            Op::Lt => v < self.value,
            Op::Le => v <= self.value,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Signal {
    pub name: &'static str,
    pub description: &'static str,
    pub conditions: &'static [Condition],
}

const fn when(column: &'static str, op: Op, value: Decimal) -> Condition {
    Condition { column, op, value }
}

pub const SIGNALS: [Signal; 8] = [
    Signal {
        name: "Hidden_Gem",
        description: "Small, profitable, fast-growing and under-owned by institutions",
        conditions: &[
            when("Market Cap", Op::Lt, dec!(2_000_000_000)),
            when("ROE", Op::Gt, dec!(15)),
            when("Rev. Growth", Op::Gt, dec!(15)),
            when("Shares Institut.", Op::Lt, dec!(30)),
        ],
    },
    Signal {
        name: "Value_Trap",
        description: "Cheap on multiples but low quality and shrinking",
        conditions: &[
            when(VALUE_SCORE, Op::Ge, dec!(75)),
            when(QUALITY_SCORE, Op::Le, dec!(25)),
            when("Rev. Growth", Op::Lt, dec!(0)),
        ],
    },
    Signal {
        name: "Quality_Discount",
        description: "High quality trading at a reasonable valuation",
        conditions: &[
            when(QUALITY_SCORE, Op::Ge, dec!(75)),
            when(VALUE_SCORE, Op::Ge, dec!(50)),
        ],
    },
    Signal {
        name: "Momentum_Breakout",
        description: "Strong momentum on heavy volume without being overbought",
        conditions: &[
            when(MOMENTUM_SCORE, Op::Ge, dec!(70)),
            when("Rel. Volume", Op::Gt, dec!(1.5)),
            when("RSI", Op::Lt, dec!(70)),
        ],
    },
    Signal {
        name: "Oversold_Quality",
        description: "Quality business in oversold territory",
        conditions: &[
            when("RSI", Op::Lt, dec!(30)),
            when(QUALITY_SCORE, Op::Ge, dec!(50)),
        ],
    },
    Signal {
        name: "Dividend_Trap",
        description: "Very high yield not covered by earnings",
        conditions: &[
            when("Div. Yield", Op::Gt, dec!(8)),
            when("Payout Ratio", Op::Gt, dec!(100)),
        ],
    },
    Signal {
        name: "Turnaround",
        description: "Grey-zone Altman Z with positive free cash flow and recovering price",
        conditions: &[
            when("Z-Score", Op::Gt, dec!(1.8)),
            when("Z-Score", Op::Lt, dec!(3)),
            when("FCF", Op::Gt, dec!(0)),
            when("Return 3M", Op::Gt, dec!(10)),
        ],
    },
    Signal {
        name: "Garp",
        description: "Growth at a reasonable price",
        conditions: &[
            when("PEG Ratio", Op::Gt, dec!(0)),
            when("PEG Ratio", Op::Lt, dec!(1)),
            when("EPS Growth", Op::Gt, dec!(15)),
        ],
    },
];

impl Signal {
    /// Evaluate this flag for every row. All zeros when a column is unusable.
    pub fn evaluate(&self, table: &Table) -> Vec<Decimal> {
        let rows = table.num_rows();
        let mut columns = Vec::with_capacity(self.conditions.len());
        for cond in self.conditions {
            match table.numbers(cond.column) {
                Some(values) if table.has_values(cond.column) => columns.push(values),
                _ => {
                    debug!(
                        signal = self.name,
                        column = cond.column,
                        "signal disabled: column absent or empty"
                    );
                    return vec![Decimal::ZERO; rows];
                }
            }
        }

        (0..rows)
            .map(|row| {
                let all = self
                    .conditions
                    .iter()
                    .zip(&columns)
                    .all(|(cond, values)| cond.holds(values[row]));
                if all {
                    FLAG_ON
                } else {
                    Decimal::ZERO
                }
            })
            .collect()
    }
}

/// Append every flag column plus `Signal_Count` to a copy of `table`.
pub fn detect_signals(table: &Table) -> ScreenerResult<Table> {
    detect_with(table, &SIGNALS)
}

pub fn detect_with(table: &Table, signals: &[Signal]) -> ScreenerResult<Table> {
    let mut out = table.clone();
    let mut counts = vec![Decimal::ZERO; table.num_rows()];
    for signal in signals {
        let flags = signal.evaluate(table);
        for (count, flag) in counts.iter_mut().zip(&flags) {
            if *flag == FLAG_ON {
                *count += Decimal::ONE;
            }
        }
        out.insert_column(signal.name, Column::numbers(flags.into_iter().map(Some)))?;
    }
    out.insert_column(SIGNAL_COUNT, Column::numbers(counts.into_iter().map(Some)))?;
    Ok(out)
}
