use serde::Deserialize;
use std::time::Duration;

/// Default per-request timeout when the configuration omits `timeout`
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Main configuration structure for Mock-Traffic
///
/// Field names on the wire follow the `config.json` layout
/// (`root_urls`, `blacklisted_urls`, `min_sleep`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Seed URLs, in initial frontier order
    #[serde(rename = "root_urls")]
    pub seed_urls: Vec<String>,

    /// Substrings that exclude a URL from the frontier
    #[serde(rename = "blacklisted_urls")]
    pub blacklist: Vec<String>,

    /// Maximum crawl depth. Carried for compatibility, not enforced.
    pub max_depth: u32,

    /// Lower bound of the delay between requests (milliseconds)
    #[serde(rename = "min_sleep")]
    pub min_delay_ms: u64,

    /// Upper bound of the delay between requests (milliseconds)
    #[serde(rename = "max_sleep")]
    pub max_delay_ms: u64,

    /// Total time allowed for a single request (milliseconds)
    #[serde(rename = "timeout", default = "default_timeout")]
    pub request_timeout_ms: u64,
}

impl Config {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
