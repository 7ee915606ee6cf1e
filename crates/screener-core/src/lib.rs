pub mod error;
pub mod filters;
pub mod loader;
pub mod scoring;
pub mod table;
pub mod types;
pub mod universe;

#[cfg(feature = "signals")]
pub mod signals;

#[cfg(feature = "ranking")]
pub mod ranking;

#[cfg(feature = "analytics")]
pub mod analytics;

pub use error::ScreenerError;
pub use types::*;

/// Standard result type for all screener operations
pub type ScreenerResult<T> = Result<T, ScreenerError>;
