use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenerError {
    #[error("Source not found: {path}")]
    SourceNotFound { path: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ScreenerError {
    fn from(e: serde_json::Error) -> Self {
        ScreenerError::SerializationError(e.to_string())
    }
}

impl From<csv::Error> for ScreenerError {
    fn from(e: csv::Error) -> Self {
        ScreenerError::Csv(e.to_string())
    }
}

impl From<std::io::Error> for ScreenerError {
    fn from(e: std::io::Error) -> Self {
        ScreenerError::Io(e.to_string())
    }
}
