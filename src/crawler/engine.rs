//! Traffic engine - lifecycle and composition
//!
//! An `Engine` owns everything one traffic run needs: its configuration,
//! frontier, stats reporter, and request engine. `start` spawns the
//! scheduler loop as a tokio task; `stop` signals it and waits for it to
//! exit. Both are idempotent.
//!
//! Independent engines share nothing, so several may run in one process.

use crate::config::{load_config, Config};
use crate::crawler::fetcher::{build_http_client, RequestEngine};
use crate::crawler::frontier::Frontier;
use crate::crawler::scheduler::{DelayWindow, Scheduler};
use crate::output::{StatsObserver, StatsReporter, TrafficSummary};
use crate::state::{EngineState, SchedulerState, StopReason};
use crate::url::Blacklist;
use crate::TrafficError;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handles to a live scheduler task
struct RunningScheduler {
    stop: watch::Sender<bool>,
    state: watch::Receiver<SchedulerState>,
    handle: JoinHandle<StopReason>,
}

/// A traffic-generation engine
pub struct Engine {
    config: Config,
    frontier: Frontier,
    stats: StatsReporter,
    requests: RequestEngine,
    running: Option<RunningScheduler>,
    started_at: Option<DateTime<Utc>>,
    last_stop: Option<StopReason>,
}

impl Engine {
    /// Creates a stopped engine
    ///
    /// # Arguments
    ///
    /// * `config` - The traffic configuration; owned by the engine from here on
    /// * `observer` - Receives the success count after every successful fetch
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Ready to `start`
    /// * `Err(TrafficError)` - The HTTP client could not be built
    pub fn new(config: Config, observer: Arc<dyn StatsObserver>) -> Result<Self, TrafficError> {
        let client = build_http_client()?;
        let frontier = Frontier::new();
        let stats = StatsReporter::new(observer);
        let requests = RequestEngine::new(
            client,
            frontier.clone(),
            Blacklist::new(config.blacklist.clone()),
            stats.clone(),
            config.request_timeout(),
        );

        Ok(Self {
            config,
            frontier,
            stats,
            requests,
            running: None,
            started_at: None,
            last_stop: None,
        })
    }

    /// Loads a configuration file and creates an engine from it
    ///
    /// A configuration that fails to load or validate is fatal: it is
    /// reported once, here, and no engine exists to be started.
    pub fn from_path(path: &Path, observer: Arc<dyn StatsObserver>) -> Result<Self, TrafficError> {
        let config = load_config(path).map_err(|e| {
            tracing::error!("Error loading {}: {}", path.display(), e);
            TrafficError::Config(e)
        })?;
        tracing::debug!("Configuration loaded successfully from {}", path.display());
        Self::new(config, observer)
    }

    /// Starts generating traffic
    ///
    /// Every run gets a fresh frontier seeded from the configured root URLs.
    /// The previous run's frontier is discarded, and fetches still in flight
    /// from that run only ever write into it. With no root URLs the engine
    /// stays stopped and no request is sent. Starting a running engine is a
    /// no-op.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// The engine state after the call
    pub fn start(&mut self) -> EngineState {
        if self.state().is_running() {
            tracing::debug!("Traffic generation already running");
            return EngineState::Running;
        }
        self.reap();

        self.frontier = Frontier::new();
        self.requests = self.requests.with_frontier(self.frontier.clone());
        let seeded = self.frontier.seed(self.config.seed_urls.iter().cloned());
        tracing::debug!("Seeded frontier with {} root URLs", seeded);

        if seeded == 0 {
            tracing::error!("No URLs to visit. Check root_urls in the configuration");
            return EngineState::Stopped;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let (scheduler, state_rx) = Scheduler::new(
            self.frontier.clone(),
            self.requests.clone(),
            DelayWindow::from_config(&self.config),
            stop_rx,
        );
        let handle = tokio::spawn(scheduler.run());

        self.running = Some(RunningScheduler {
            stop: stop_tx,
            state: state_rx,
            handle,
        });
        self.started_at.get_or_insert_with(Utc::now);
        self.last_stop = None;

        tracing::info!(
            "Traffic generation started with {} URLs in frontier",
            self.frontier.len()
        );
        EngineState::Running
    }

    /// Stops generating traffic
    ///
    /// Cancels the next scheduled cycle and waits for the loop to exit.
    /// Requests already in flight are left to complete. Stopping a stopped
    /// engine is a no-op.
    ///
    /// # Returns
    ///
    /// Why the loop ended, or `None` if the engine was not running
    pub async fn stop(&mut self) -> Option<StopReason> {
        let running = self.running.take()?;
        running.stop.send_replace(true);
        let mut handle = running.handle;
        let reason = Self::join(&mut handle).await;
        self.last_stop = reason;
        reason
    }

    /// Waits for the loop to end on its own (frontier exhausted)
    ///
    /// Cancel-safe: dropping the returned future leaves the engine running.
    pub async fn wait(&mut self) -> Option<StopReason> {
        let running = self.running.as_mut()?;
        let reason = Self::join(&mut running.handle).await;
        self.running = None;
        self.last_stop = reason;
        reason
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        match &self.running {
            Some(running) if !running.handle.is_finished() => EngineState::Running,
            _ => EngineState::Stopped,
        }
    }

    /// Position of the scheduler loop within its cycle
    pub fn scheduler_state(&self) -> SchedulerState {
        self.running
            .as_ref()
            .map(|running| *running.state.borrow())
            .unwrap_or(SchedulerState::Stopped)
    }

    /// Why the most recent run ended, if it has
    pub fn last_stop_reason(&self) -> Option<StopReason> {
        match &self.running {
            Some(running) if running.handle.is_finished() => Some(StopReason::FrontierExhausted),
            Some(_) => None,
            None => self.last_stop,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn stats(&self) -> &StatsReporter {
        &self.stats
    }

    /// Snapshot of the run so far
    pub fn summary(&self) -> TrafficSummary {
        TrafficSummary {
            started_at: self.started_at,
            taken_at: Utc::now(),
            successes: self.stats.request_count(),
            failures: self.stats.failure_count(),
            frontier_remaining: self.frontier.len(),
        }
    }

    /// Drops handles to a loop that already exited
    ///
    /// Cancellation always goes through `stop`, which takes the handles, so a
    /// loop found finished here ended because the frontier ran dry.
    fn reap(&mut self) {
        if let Some(running) = self.running.take() {
            if running.handle.is_finished() {
                self.last_stop = Some(StopReason::FrontierExhausted);
            } else {
                self.running = Some(running);
            }
        }
    }

    async fn join(handle: &mut JoinHandle<StopReason>) -> Option<StopReason> {
        match handle.await {
            Ok(reason) => Some(reason),
            Err(e) => {
                tracing::error!("Scheduler task failed: {}", e);
                None
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.stop.send_replace(true);
        }
    }
}
