//! State module for tracking engine progress
//!
//! # Components
//!
//! - `EngineState`: whether an engine is generating traffic
//! - `SchedulerState`: the position of the control loop within a cycle
//! - `StopReason`: why a control loop ended

mod engine_state;

// Re-export main types
pub use engine_state::{EngineState, SchedulerState, StopReason};
