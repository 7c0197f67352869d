//! Success counting and stats reporting
//!
//! `StatsReporter` owns the engine's counters. Fetch-completion tasks share
//! it by cloning the handle; increments are atomic, and each success pushes
//! the new total to the registered observer.

use crate::output::traits::StatsObserver;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct ReporterInner {
    /// Successful fetches; only ever incremented
    request_count: AtomicU64,

    /// Failed fetches (HTTP or transport), tracked separately
    failure_count: AtomicU64,

    observer: Arc<dyn StatsObserver>,
}

/// Shared handle to an engine's counters and observer
#[derive(Clone)]
pub struct StatsReporter {
    inner: Arc<ReporterInner>,
}

impl StatsReporter {
    pub fn new(observer: Arc<dyn StatsObserver>) -> Self {
        Self {
            inner: Arc::new(ReporterInner {
                request_count: AtomicU64::new(0),
                failure_count: AtomicU64::new(0),
                observer,
            }),
        }
    }

    /// Records a successful fetch and notifies the observer
    ///
    /// Every count is delivered exactly once. Concurrent completions notify
    /// from their own tasks, so one may deliver 3 before another delivers 2.
    ///
    /// # Returns
    ///
    /// The new success count
    pub fn on_success(&self) -> u64 {
        let count = self.inner.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.observer.on_stats(count);
        tracing::debug!("Broadcasted stats: {}", count);
        count
    }

    /// Records a failed fetch. The success count and observer are untouched.
    pub fn on_failure(&self) -> u64 {
        self.inner.failure_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn request_count(&self) -> u64 {
        self.inner.request_count.load(Ordering::SeqCst)
    }

    pub fn failure_count(&self) -> u64 {
        self.inner.failure_count.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for StatsReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsReporter")
            .field("request_count", &self.request_count())
            .field("failure_count", &self.failure_count())
            .finish()
    }
}

/// End-of-run summary of an engine
#[derive(Debug, Clone)]
pub struct TrafficSummary {
    /// When the engine was first started
    pub started_at: Option<DateTime<Utc>>,

    /// When the summary was taken
    pub taken_at: DateTime<Utc>,

    /// Successful fetches
    pub successes: u64,

    /// Failed fetches
    pub failures: u64,

    /// URLs still waiting in the frontier
    pub frontier_remaining: usize,
}

impl TrafficSummary {
    /// Seconds between start and the moment the summary was taken
    pub fn duration_seconds(&self) -> Option<i64> {
        self.started_at
            .map(|started| (self.taken_at - started).num_seconds())
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &TrafficSummary) {
    println!("=== Traffic Summary ===\n");

    if let Some(started) = summary.started_at {
        println!("  Started: {}", started.to_rfc3339());
    }
    println!("  Finished: {}", summary.taken_at.to_rfc3339());
    if let Some(seconds) = summary.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    let attempts = summary.successes + summary.failures;
    let success_rate = if attempts > 0 {
        (summary.successes as f64 / attempts as f64) * 100.0
    } else {
        0.0
    };

    println!("  Successful requests: {}", summary.successes);
    println!("  Failed requests: {}", summary.failures);
    println!(
        "  Success rate: {:.1}% ({} / {} completed requests)",
        success_rate, summary.successes, attempts
    );
    println!("  URLs left in frontier: {}", summary.frontier_remaining);
}
