/// Lifecycle state definitions for the engine and its scheduler loop
use std::fmt;

/// Represents whether an engine is generating traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineState {
    /// Never started, stopped externally, or the frontier ran dry
    #[default]
    Stopped,

    /// The scheduler loop is alive
    Running,
}

impl EngineState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents where the scheduler loop is within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchedulerState {
    /// About to run a cycle step (pick and dispatch)
    #[default]
    Idle,

    /// Sleeping out the randomized delay between requests
    Waiting,

    /// Terminal: the loop has exited and will not run again
    Stopped,
}

impl SchedulerState {
    /// Returns true if this is a terminal state (no further cycles)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a scheduler loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// `stop()` was called or the stop signal was dropped
    Cancelled,

    /// A cycle step found nothing left to visit
    FrontierExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::FrontierExhausted => write!(f, "frontier exhausted"),
        }
    }
}
