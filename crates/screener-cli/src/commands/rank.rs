use std::time::Instant;

use clap::Args;
use serde_json::json;

use screener_core::analytics::{top_dividend, top_n};
use screener_core::scoring::MASTER_SCORE;

use super::{envelope, CommandResult, FilterArgs, Session};

/// Arguments for leaderboards
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RankArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Score column to rank by
    #[arg(long, default_value = MASTER_SCORE)]
    pub score: String,

    /// Number of rows
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Rank dividend payers by yield instead of a score
    #[arg(long, conflicts_with = "score")]
    pub dividend: bool,
}

pub fn run_rank(session: &Session, args: RankArgs) -> CommandResult {
    let started = Instant::now();
    let spec = args.filter.build()?;
    let universe = session.universe()?;
    let screen = universe.screen(&spec);
    let mut warnings = screen.warnings;

    let (methodology, rows) = if args.dividend {
        (
            "Top dividend payers by yield",
            serde_json::to_value(top_dividend(&screen.table, args.top))?,
        )
    } else {
        if !screen.table.has_column(&args.score) {
            warnings.push(format!("score column '{}' not in data", args.score));
        }
        (
            "Top rows by score, nulls last",
            serde_json::to_value(top_n(&screen.table, &args.score, args.top))?,
        )
    };

    let result = json!({
        "matched": screen.matched,
        "rows": rows,
    });
    envelope(methodology, &spec, warnings, started, result)
}
