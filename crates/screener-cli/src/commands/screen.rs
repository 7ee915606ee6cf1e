use std::time::Instant;

use clap::Args;
use serde_json::json;

use screener_core::analytics::summarize;

use super::{envelope, CommandResult, FilterArgs, Session, ViewArgs, DEFAULT_COLUMNS};

/// Arguments for filtering the scored universe
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScreenArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run_screen(session: &Session, args: ScreenArgs) -> CommandResult {
    let started = Instant::now();
    let spec = args.filter.build()?;
    let universe = session.universe()?;
    let screen = universe.screen(&spec);
    let counts = screen.counts();

    let rows = args.view.render(&screen.table, &DEFAULT_COLUMNS);
    let result = json!({
        "matched": counts.matched,
        "total": counts.total,
        "share_pct": counts.share_pct.round_dp(1),
        "summary": summarize(&screen.table, screen.total),
        "rows": rows,
    });

    envelope(
        "Conjunctive range and category filters over the scored universe",
        &spec,
        screen.warnings,
        started,
        result,
    )
}
