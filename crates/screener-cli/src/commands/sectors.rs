use std::time::Instant;

use clap::Args;
use serde_json::json;

use screener_core::analytics::sector_summary;

use super::{envelope, CommandResult, FilterArgs, Session};

/// Arguments for the per-sector breakdown
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SectorsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

pub fn run_sectors(session: &Session, args: SectorsArgs) -> CommandResult {
    let started = Instant::now();
    let spec = args.filter.build()?;
    let universe = session.universe()?;
    let screen = universe.screen(&spec);

    let result = json!({
        "matched": screen.matched,
        "rows": sector_summary(&screen.table),
    });
    envelope(
        "Per-sector counts, medians and means over the screened rows",
        &spec,
        screen.warnings,
        started,
        result,
    )
}
