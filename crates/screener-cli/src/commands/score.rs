use std::time::Instant;

use clap::Args;
use serde_json::json;

use super::{envelope, CommandResult, Session, ViewArgs, DEFAULT_COLUMNS};

/// Arguments for scoring the whole universe
#[derive(Args)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run_score(session: &Session, args: ScoreArgs) -> CommandResult {
    let started = Instant::now();
    let universe = session.universe()?;
    let calibration = universe.calibration();

    let inactive: Vec<String> = calibration
        .criteria
        .iter()
        .filter(|c| !c.is_active())
        .map(|c| {
            format!(
                "{} criterion on '{}' inactive: column absent or empty",
                c.sub_score, c.column
            )
        })
        .collect();

    let rows = args.view.render(universe.table(), &DEFAULT_COLUMNS);
    let assumptions = json!({
        "universe_rows": calibration.universe_rows,
        "active_criteria": calibration.active_criteria(),
        "sort_by": args.view.sort_by,
    });
    let result = json!({
        "total": universe.len(),
        "rows": rows,
    });

    envelope(
        "Threshold scoring with quantile cutoffs frozen on the loaded universe",
        &assumptions,
        inactive,
        started,
        result,
    )
}
