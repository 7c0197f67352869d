//! Scheduler for pacing traffic
//!
//! This module handles:
//! - The control loop that picks a URL, dispatches it, and waits
//! - Sampling the randomized delay between requests
//! - Reacting to the stop signal at every cycle boundary and mid-wait
//!
//! The loop never waits on a fetch. Dispatched requests run as their own
//! tasks and are left alone when the loop stops.

use crate::config::Config;
use crate::crawler::fetcher::RequestEngine;
use crate::crawler::frontier::Frontier;
use crate::state::{SchedulerState, StopReason};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::watch;

/// Inclusive window the inter-request delay is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayWindow {
    min_ms: u64,
    max_ms: u64,
}

impl DelayWindow {
    /// Creates a window; bounds given in the wrong order are swapped
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.min_delay_ms, config.max_delay_ms)
    }

    /// Draws a delay uniformly from `[min, max]` milliseconds
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }
}

/// The traffic control loop
///
/// A scheduler is consumed by [`Scheduler::run`]; the engine spawns it as a
/// task and signals it through a `watch` channel.
pub struct Scheduler {
    frontier: Frontier,
    requests: RequestEngine,
    delays: DelayWindow,
    stop: watch::Receiver<bool>,
    state: watch::Sender<SchedulerState>,
}

impl Scheduler {
    /// Creates a scheduler
    ///
    /// # Arguments
    ///
    /// * `frontier` - The frontier to pick from
    /// * `requests` - The request engine to dispatch through
    /// * `delays` - The delay window between cycles
    /// * `stop` - Set to `true` to stop the loop
    ///
    /// # Returns
    ///
    /// The scheduler and a receiver tracking its state
    pub fn new(
        frontier: Frontier,
        requests: RequestEngine,
        delays: DelayWindow,
        stop: watch::Receiver<bool>,
    ) -> (Self, watch::Receiver<SchedulerState>) {
        let (state, state_rx) = watch::channel(SchedulerState::Idle);
        let scheduler = Self {
            frontier,
            requests,
            delays,
            stop,
            state,
        };
        (scheduler, state_rx)
    }

    /// Runs cycles until stopped or the frontier is empty
    ///
    /// Each cycle:
    /// 1. Stops if the stop signal is set or nothing is left to pick
    /// 2. Removes a random URL from the frontier and dispatches it
    /// 3. Waits a sampled delay, returning early if stop is signalled
    pub async fn run(mut self) -> StopReason {
        let mut rng = StdRng::from_entropy();

        loop {
            self.state.send_replace(SchedulerState::Idle);

            if *self.stop.borrow() {
                return self.finish(StopReason::Cancelled);
            }

            let url = match self.frontier.pick_random() {
                Some(url) => url,
                None => return self.finish(StopReason::FrontierExhausted),
            };

            tracing::debug!(
                "Dispatching {} ({} URLs left in frontier)",
                url,
                self.frontier.len()
            );
            // In-flight requests are never awaited or cancelled here
            drop(self.requests.dispatch(url));

            let delay = self.delays.sample(&mut rng);
            self.state.send_replace(SchedulerState::Waiting);
            tracing::trace!("Sleeping {:?} before next request", delay);

            let cancelled = tokio::select! {
                _ = tokio::time::sleep(delay) => false,
                _ = stop_requested(&mut self.stop) => true,
            };
            if cancelled {
                return self.finish(StopReason::Cancelled);
            }
        }
    }

    fn finish(&self, reason: StopReason) -> StopReason {
        self.state.send_replace(SchedulerState::Stopped);
        tracing::info!("Traffic generation stopped: {}", reason);
        reason
    }
}

/// Resolves once the stop flag is set or its sender is gone
async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    loop {
        if *stop.borrow_and_update() {
            return;
        }
        if stop.changed().await.is_err() {
            return;
        }
    }
}
