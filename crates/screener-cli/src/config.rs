use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Top-level configuration for the CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data: DataConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = env::var("SCREENER_DATA")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let log_level =
            env::var("SCREENER_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let log_format = match env::var("SCREENER_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            data: DataConfig { source },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
        })
    }
}

/// Where the universe comes from.
///
/// Each invocation loads the file once, so there is no cache lifetime to
/// configure here. Long-running hosts set one on `UniverseCache::with_ttl`.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub source: Option<PathBuf>,
}

impl DataConfig {
    /// The `--data` flag wins over `SCREENER_DATA`.
    pub fn resolve(&self, flag: Option<&str>) -> Result<PathBuf, ConfigError> {
        flag.map(PathBuf::from)
            .or_else(|| self.source.clone())
            .ok_or(ConfigError::MissingSource)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event, no target.
    Compact,
    /// Default `fmt` layout with targets.
    Full,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            _ => Err(ConfigError::InvalidLogFormat {
                value: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSource,
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSource => {
                write!(f, "no data file: pass --data or set SCREENER_DATA")
            }
            ConfigError::InvalidLogFormat { value } => write!(
                f,
                "SCREENER_LOG_FORMAT must be 'compact' or 'full', got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
