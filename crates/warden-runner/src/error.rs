//! Error types for the server lifecycle controller.
//!
//! Start-phase failures are returned to the caller as [`RunnerError`].
//! [`SignalError`] describes failed signal delivery; `stop` logs it and
//! carries on, so it never reaches the caller of `stop`.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::state::LifecyclePhase;

/// Errors returned while starting a managed server.
#[derive(Debug, Clone, Error)]
pub enum RunnerError {
    /// The run command contained no whitespace-delimited tokens.
    #[error("run command is empty")]
    EmptyCommand,

    /// The operating system could not create the server process.
    #[error("failed to start server '{program}': {source}")]
    SpawnFailed {
        /// Executable that was launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The spawn reported success but yielded no usable process handle.
    #[error("server process '{program}' exited immediately")]
    ImmediateExit {
        /// Executable that was launched.
        program: String,
    },

    /// The health-check request could not be constructed.
    #[error("failed to create health check request: {message}")]
    ProbeConstructionFailed {
        /// Description of the construction failure.
        message: String,
    },

    /// No readiness probe succeeded before the startup deadline.
    #[error("server did not start within {wait_ms}ms")]
    StartupTimeout {
        /// Configured startup-wait budget.
        wait_ms: u64,
    },

    /// `start` was called while a server process is still held.
    #[error("server already started with pid {pid}")]
    AlreadyStarted {
        /// Process identifier of the held server.
        pid: u32,
    },

    /// `start` was called on a controller that has already been used.
    #[error("server runner is {phase}; start requires an idle runner")]
    NotIdle {
        /// Phase the controller was in.
        phase: LifecyclePhase,
    },
}

/// Errors raised while delivering a signal to a managed process.
#[derive(Debug, Error)]
pub enum SignalError {
    /// The process identifier does not fit the platform's pid type.
    #[error("process id {pid} is out of range")]
    InvalidPid {
        /// Offending identifier.
        pid: u32,
    },

    /// The operating system rejected the signal.
    #[error("failed to send {signal} to process {pid}: {source}")]
    Delivery {
        /// Target process or process group.
        pid: u32,
        /// Signal name.
        signal: &'static str,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The platform has no equivalent for the requested signal.
    #[error("{signal} is not supported on this platform")]
    Unsupported {
        /// Signal name.
        signal: &'static str,
    },
}
