//! Lifecycle phases of a managed server.

use std::fmt;

/// Where a [`ServerRunner`](crate::ServerRunner) is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// No start has been attempted.
    #[default]
    Idle,
    /// The process is being spawned or probed.
    Starting,
    /// The readiness probe succeeded.
    Ready,
    /// A stop is in progress.
    Stopping,
    /// The process has exited or been killed.
    Stopped,
    /// Start failed. A process may still be held after a startup timeout.
    Failed,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
