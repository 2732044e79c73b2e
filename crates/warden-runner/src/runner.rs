//! The server lifecycle controller.

use std::env;
use std::sync::Arc;

use tracing::{debug, info, warn};
use warden_config::{ProgramConfig, ServerConfig};

use crate::command::Invocation;
use crate::error::RunnerError;
use crate::lifecycle::{self, LIFECYCLE_TARGET, StopOutcome};
use crate::probe::{self, HttpProbe, ReadinessProbe};
use crate::process::{
    CapturedOutput, ChildProcess, ProcessLauncher, ProcessSignals, SystemLauncher, SystemSignals,
};
use crate::state::LifecyclePhase;

struct ManagedProcess {
    pid: u32,
    child: Box<dyn ChildProcess>,
}

/// Starts, probes, and stops a single external server process.
///
/// The launcher, probe, and signal sink are injectable so the lifecycle can
/// be driven by fakes in tests; [`ServerRunner::new`] wires the system
/// implementations.
pub struct ServerRunner<L = SystemLauncher, P = HttpProbe, S = SystemSignals> {
    config: ServerConfig,
    launcher: L,
    probe: P,
    signals: S,
    process: Option<ManagedProcess>,
    port: Option<u16>,
    output: CapturedOutput,
    phase: LifecyclePhase,
    last_stop: Option<StopOutcome>,
}

impl ServerRunner {
    /// Creates a controller that spawns real processes and probes over HTTP.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self::with_parts(config, SystemLauncher, HttpProbe::default(), SystemSignals)
    }
}

impl<L, P, S> ServerRunner<L, P, S>
where
    L: ProcessLauncher,
    P: ReadinessProbe,
    S: ProcessSignals,
{
    /// Creates a controller from explicit collaborators.
    #[must_use]
    pub fn with_parts(config: ServerConfig, launcher: L, probe: P, signals: S) -> Self {
        Self {
            config,
            launcher,
            probe,
            signals,
            process: None,
            port: None,
            output: CapturedOutput::default(),
            phase: LifecyclePhase::Idle,
            last_stop: None,
        }
    }

    /// Spawns the server described by `run_command` and waits until it
    /// answers the readiness probe.
    ///
    /// The process is left running when readiness fails after a successful
    /// spawn; call [`ServerRunner::stop`] to reclaim it.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::AlreadyStarted`] while a process is still held,
    /// [`RunnerError::NotIdle`] once the controller has left `Idle`, and
    /// otherwise any failure from command resolution, spawning, or the
    /// readiness wait.
    pub fn start(&mut self, program: &ProgramConfig, run_command: &str) -> Result<(), RunnerError> {
        if let Some(process) = &self.process {
            return Err(RunnerError::AlreadyStarted { pid: process.pid });
        }
        if self.phase != LifecyclePhase::Idle {
            return Err(RunnerError::NotIdle { phase: self.phase });
        }

        self.phase = LifecyclePhase::Starting;
        match self.launch_and_wait(program, run_command) {
            Ok(()) => {
                self.phase = LifecyclePhase::Ready;
                info!(
                    target: LIFECYCLE_TARGET,
                    pid = self.pid(),
                    port = self.port,
                    "server ready"
                );
                Ok(())
            }
            Err(error) => {
                self.phase = LifecyclePhase::Failed;
                warn!(
                    target: LIFECYCLE_TARGET,
                    pid = self.pid(),
                    error = %error,
                    "server failed to start"
                );
                Err(error)
            }
        }
    }

    fn launch_and_wait(&mut self, program: &ProgramConfig, run_command: &str) -> Result<(), RunnerError> {
        let invocation = Invocation::resolve(run_command, program, env::vars_os())?;
        let launched = self
            .launcher
            .launch(&invocation)
            .map_err(|source| RunnerError::SpawnFailed {
                program: invocation.program().to_owned(),
                source: Arc::new(source),
            })?;
        let (child, output) = launched.into_parts();
        let Some(pid) = child.id() else {
            return Err(RunnerError::ImmediateExit {
                program: invocation.program().to_owned(),
            });
        };
        info!(
            target: LIFECYCLE_TARGET,
            pid,
            program = invocation.program(),
            args = ?invocation.args(),
            "server process spawned"
        );

        self.output = output;
        self.process = Some(ManagedProcess { pid, child });
        let port = self.config.port();
        self.port = Some(port);
        probe::await_ready(&self.probe, port, self.config.startup_wait())
    }

    /// Stops the server: interrupt first, then kill the process tree once the
    /// grace period has elapsed.
    ///
    /// Does nothing when no process is held. Signal failures are logged,
    /// never returned.
    pub fn stop(&mut self) {
        let Some(ManagedProcess { pid, child }) = self.process.take() else {
            debug!(target: LIFECYCLE_TARGET, "no server process to stop");
            return;
        };

        self.phase = LifecyclePhase::Stopping;
        let outcome = lifecycle::terminate(&self.signals, child, pid, self.config.grace_period());
        self.phase = LifecyclePhase::Stopped;
        self.port = None;
        self.last_stop = Some(outcome);
        info!(target: LIFECYCLE_TARGET, pid, ?outcome, "server stopped");
    }
}

impl<L, P, S> ServerRunner<L, P, S> {
    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Identifier of the held server process, if any.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|process| process.pid)
    }

    /// Port the held server is expected to bind; cleared by `stop`.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Output captured from the most recently spawned process.
    #[must_use]
    pub const fn output(&self) -> &CapturedOutput {
        &self.output
    }

    /// How the most recent stop concluded, if a process has been stopped.
    #[must_use]
    pub const fn last_stop(&self) -> Option<StopOutcome> {
        self.last_stop
    }

    /// Configuration this controller was built with.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl<L, P, S> std::fmt::Debug for ServerRunner<L, P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerRunner")
            .field("config", &self.config)
            .field("pid", &self.pid())
            .field("port", &self.port)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<L, P, S> Drop for ServerRunner<L, P, S> {
    fn drop(&mut self) {
        if let Some(process) = &self.process {
            warn!(
                target: LIFECYCLE_TARGET,
                pid = process.pid,
                "server runner dropped without stop; process left running"
            );
        }
    }
}
