//! Mock-Traffic: a synthetic web traffic generator
//!
//! This crate repeatedly picks a URL from a growing frontier, fetches it,
//! harvests hyperlinks from the response to extend the frontier, and reports
//! cumulative success counts to an observer. Traffic is shaped by a substring
//! blacklist, a randomized delay window between requests, and a per-request
//! timeout.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Mock-Traffic operations
#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// Any of these is fatal: an engine is never started from a configuration
/// that failed to load.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Mock-Traffic operations
pub type Result<T> = std::result::Result<T, TrafficError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Engine, Frontier, RequestOutcome};
pub use output::{StatsObserver, StatsReporter};
pub use state::{EngineState, SchedulerState};
pub use crate::url::{is_blacklisted, Blacklist};
