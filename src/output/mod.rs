//! Output module for reporting traffic statistics
//!
//! This module handles:
//! - Counting successful and failed fetches
//! - Pushing success counts to an external observer
//! - Printing an end-of-run summary

pub mod stats;
mod traits;

pub use stats::{print_summary, StatsReporter, TrafficSummary};
pub use traits::{ChannelObserver, LoggingObserver, NullObserver, StatsObserver};
