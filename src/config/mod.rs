//! Configuration module for Mock-Traffic
//!
//! This module handles loading, parsing, and validating the traffic
//! configuration. Both the JSON layout of `config.json` and an equivalent
//! TOML layout are accepted.
//!
//! # Example
//!
//! ```no_run
//! use mock_traffic::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.json")).unwrap();
//! println!("Seeding frontier with {} URLs", config.seed_urls.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DEFAULT_TIMEOUT_MS};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, ConfigFormat,
};
