mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::warn;

use commands::presets::PresetsArgs;
use commands::rank::RankArgs;
use commands::score::ScoreArgs;
use commands::screen::ScreenArgs;
use commands::sectors::SectorsArgs;
use commands::thresholds::ThresholdsArgs;
use commands::Session;
use config::AppConfig;

/// Score and screen an equity universe
#[derive(Parser)]
#[command(
    name = "screener",
    version,
    about = "Score and screen an equity universe",
    long_about = "Loads a CSV of per-company metrics, computes sub-scores and composite \
                  master scores with decimal precision, and filters the scored universe \
                  with numeric ranges, category sets, index membership and presets."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Universe CSV (defaults to SCREENER_DATA)
    #[arg(long, global = true)]
    data: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every row of the universe
    Score(ScoreArgs),
    /// Filter the scored universe
    Screen(ScreenArgs),
    /// List or show filter presets
    Presets(PresetsArgs),
    /// Leaderboard by score or dividend yield
    Rank(RankArgs),
    /// Per-sector breakdown of the screened rows
    Sectors(SectorsArgs),
    /// Show scoring thresholds as calibrated on the universe
    Thresholds(ThresholdsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    if let Err(e) = telemetry::init(&config.telemetry) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let session = Session {
        config,
        data: cli.data,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Score(args) => commands::score::run_score(&session, args),
        Commands::Screen(args) => commands::screen::run_screen(&session, args),
        Commands::Presets(args) => commands::presets::run_presets(args),
        Commands::Rank(args) => commands::rank::run_rank(&session, args),
        Commands::Sectors(args) => commands::sectors::run_sectors(&session, args),
        Commands::Thresholds(args) => commands::thresholds::run_thresholds(&session, args),
        Commands::Version => {
            println!("screener {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            warn!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
