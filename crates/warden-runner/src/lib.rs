//! Lifecycle controller for an externally spawned HTTP server.
//!
//! [`ServerRunner`] starts a server from a whitespace-split run command,
//! blocks until anything answers on `http://localhost:<port>/`, and later
//! stops it by interrupting the process and killing its process group if it
//! outlives the grace period.
//!
//! ```no_run
//! use warden_config::{ProgramConfig, ServerConfig};
//! use warden_runner::ServerRunner;
//!
//! let mut runner = ServerRunner::new(ServerConfig::new(8000, 5_000));
//! runner.start(&ProgramConfig::default(), "python3 -m http.server 8000")?;
//! runner.stop();
//! # Ok::<(), warden_runner::RunnerError>(())
//! ```

mod command;
mod environment;
mod error;
mod lifecycle;
mod probe;
mod process;
mod runner;
mod state;

pub use command::Invocation;
pub use environment::merge_environment;
pub use error::{RunnerError, SignalError};
pub use lifecycle::{REAP_TIMEOUT, StopOutcome};
pub use probe::{HttpProbe, POLL_INTERVAL, PROBE_TIMEOUT, ProbeError, ReadinessProbe};
pub use process::{
    CapturedOutput, ChildProcess, LaunchedProcess, ProcessLauncher, ProcessSignals,
    SystemLauncher, SystemSignals,
};
pub use runner::ServerRunner;
pub use state::LifecyclePhase;

#[cfg(test)]
mod tests;
