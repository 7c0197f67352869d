//! Observer trait for stats updates
//!
//! The observer is the only coupling between the engine and whatever
//! presents its progress. Delivery is fire-and-forget: the engine never
//! waits on, or learns the result of, a notification.

use tokio::sync::mpsc::UnboundedSender;

/// Receives the cumulative success count every time it changes
pub trait StatsObserver: Send + Sync {
    /// Called once per successful fetch with the new total
    fn on_stats(&self, request_count: u64);
}

impl<F> StatsObserver for F
where
    F: Fn(u64) + Send + Sync,
{
    fn on_stats(&self, request_count: u64) {
        self(request_count)
    }
}

/// Writes each update to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl StatsObserver for LoggingObserver {
    fn on_stats(&self, request_count: u64) {
        tracing::info!("Traffic stats: {} requests", request_count);
    }
}

/// Forwards each update into a channel
///
/// Sends never block. If the receiving side has gone away the update is
/// dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<u64>,
}

impl ChannelObserver {
    pub fn new(sender: UnboundedSender<u64>) -> Self {
        Self { sender }
    }
}

impl StatsObserver for ChannelObserver {
    fn on_stats(&self, request_count: u64) {
        if self.sender.send(request_count).is_err() {
            tracing::trace!("Stats receiver dropped, discarding update {}", request_count);
        }
    }
}

/// Discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl StatsObserver for NullObserver {
    fn on_stats(&self, _request_count: u64) {}
}
