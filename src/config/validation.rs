use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_delay_window(config)?;
    validate_timeout(config)?;
    validate_seed_urls(&config.seed_urls)?;
    check_blacklist(&config.blacklist);
    Ok(())
}

/// The delay window must satisfy `min_sleep <= max_sleep`
fn validate_delay_window(config: &Config) -> Result<(), ConfigError> {
    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_sleep must be <= max_sleep, got {}ms > {}ms",
            config.min_delay_ms, config.max_delay_ms
        )));
    }
    Ok(())
}

fn validate_timeout(config: &Config) -> Result<(), ConfigError> {
    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout must be greater than 0ms".to_string(),
        ));
    }
    Ok(())
}

/// Every seed must be an absolute URL. An empty list is allowed.
fn validate_seed_urls(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", seed, e)))?;
    }
    Ok(())
}

/// An empty entry matches every URL, which is legal but almost never intended
fn check_blacklist(blacklist: &[String]) {
    if blacklist.iter().any(|entry| entry.is_empty()) {
        tracing::warn!("blacklisted_urls contains an empty entry; every URL will be rejected");
    }
}
