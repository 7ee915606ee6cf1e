use std::time::Instant;

use clap::Args;
use serde_json::{json, Value};

use super::{envelope, load_library, CommandResult};

/// Arguments for browsing filter presets
#[derive(Args)]
pub struct PresetsArgs {
    /// Show one preset's full filter (id or display name)
    #[arg(long)]
    pub show: Option<String>,

    /// Preset library file to use instead of the built-in presets
    #[arg(long)]
    pub presets_file: Option<String>,
}

pub fn run_presets(args: PresetsArgs) -> CommandResult {
    let started = Instant::now();
    let library = load_library(args.presets_file.as_deref())?;
    let source = json!({
        "library": args.presets_file.as_deref().unwrap_or("builtin"),
    });

    if let Some(key) = args.show {
        let preset = library.find(&key)?;
        return envelope("Preset filter definition", &source, Vec::new(), started, preset);
    }

    let rows: Vec<Value> = library
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "ranges": p.filter.ranges.len(),
                "categories": p.filter.memberships.len() + p.filter.contains_all.len(),
                "description": p.description,
            })
        })
        .collect();
    envelope("Available filter presets", &source, Vec::new(), started, rows)
}
