//! Crawler module for traffic generation
//!
//! This module contains the traffic-generation core, including:
//! - The shared frontier of pending URLs
//! - HTTP fetching and outcome handling
//! - HTML parsing and link extraction
//! - The paced scheduler loop
//! - The engine that ties them together

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use engine::Engine;
pub use fetcher::{
    build_http_client, fetch, RequestEngine, RequestOutcome, TransportCause, USER_AGENT,
};
pub use frontier::Frontier;
pub use parser::{extract_links, parse_html, ParseError};
pub use scheduler::{DelayWindow, Scheduler};

use crate::config::Config;
use crate::output::StatsObserver;
use crate::state::StopReason;
use crate::TrafficError;
use std::sync::Arc;

/// Runs traffic generation until the frontier is exhausted
///
/// This is the simplest entry point: it creates an engine, starts it, and
/// waits for the loop to end on its own. Use [`Engine`] directly to stop
/// the run from outside.
///
/// # Returns
///
/// * `Ok(Some(StopReason))` - The loop ran and ended
/// * `Ok(None)` - There was nothing to visit, so the loop never ran
/// * `Err(TrafficError)` - The engine could not be created
pub async fn generate_traffic(
    config: Config,
    observer: Arc<dyn StatsObserver>,
) -> Result<Option<StopReason>, TrafficError> {
    let mut engine = Engine::new(config, observer)?;
    if !engine.start().is_running() {
        return Ok(None);
    }
    Ok(engine.wait().await)
}
