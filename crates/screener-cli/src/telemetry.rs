//! Stderr diagnostics. Stdout carries command output only.

use std::fmt;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, TelemetryConfig};

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "invalid SCREENER_LOG_LEVEL '{}'", value)
            }
            TelemetryError::Subscriber(err) => write!(f, "could not install logger: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// `RUST_LOG` when set and valid, else the configured level.
fn level_filter(rust_log: Option<&str>, configured: &str) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = rust_log.and_then(|raw| EnvFilter::try_new(raw).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(configured).map_err(|source| TelemetryError::EnvFilter {
        value: configured.to_string(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = level_filter(rust_log.as_deref(), &config.log_level)?;
    let ansi = atty::is(atty::Stream::Stderr);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi);

    match config.log_format {
        LogFormat::Compact => builder.with_target(false).compact().try_init(),
        LogFormat::Full => builder.with_target(true).try_init(),
    }
    .map_err(TelemetryError::Subscriber)
}
