use std::time::Instant;

use clap::Args;
use serde_json::{json, Value};

use super::{envelope, CommandResult, Session};

/// Arguments for showing calibrated thresholds
#[derive(Args)]
pub struct ThresholdsArgs {
    /// Only show criteria of this sub-score, e.g. Value_Score
    #[arg(long)]
    pub sub_score: Option<String>,

    /// Only show criteria that could not be calibrated
    #[arg(long)]
    pub inactive: bool,
}

pub fn run_thresholds(session: &Session, args: ThresholdsArgs) -> CommandResult {
    let started = Instant::now();
    let universe = session.universe()?;
    let calibration = universe.calibration();

    let rows: Vec<Value> = calibration
        .criteria
        .iter()
        .filter(|c| {
            args.sub_score
                .as_deref()
                .map_or(true, |s| c.sub_score.eq_ignore_ascii_case(s))
        })
        .filter(|c| !args.inactive || !c.is_active())
        .map(|c| {
            json!({
                "sub_score": c.sub_score,
                "column": c.column,
                "points": c.points,
                "declared": c.declared.to_string(),
                "quantile": c.declared.is_empirical(),
                "resolved": c.resolved.map_or_else(|| "inactive".to_string(), |t| t.to_string()),
            })
        })
        .collect();

    let assumptions = json!({
        "universe_rows": calibration.universe_rows,
    });
    let result = json!({
        "active_criteria": calibration.active_criteria(),
        "total_criteria": calibration.criteria.len(),
        "rows": rows,
    });

    envelope(
        "Declared thresholds with quantiles resolved against the loaded universe",
        &assumptions,
        Vec::new(),
        started,
        result,
    )
}
