//! Unit tests for the CLI runtime.

use std::ffi::OsString;
use std::io;
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rstest::{fixture, rstest};
use warden_config::{Config, ProgramConfig, ServerConfig};
use warden_runner::{
    CapturedOutput, ChildProcess, Invocation, LaunchedProcess, LifecyclePhase, ProbeError,
    ProcessLauncher, ProcessSignals, ReadinessProbe, RunnerError, ServerRunner, SignalError,
    StopOutcome,
};

use crate::config::ConfigLoader;
use crate::errors::AppError;
use crate::shutdown::{ShutdownError, ShutdownSignal};
use crate::{run_with, supervise};

#[cfg(unix)]
fn exited() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}

#[cfg(windows)]
fn exited() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}

struct InstantChild;

impl ChildProcess for InstantChild {
    fn id(&self) -> Option<u32> {
        Some(7_001)
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        Ok(exited())
    }
}

struct InstantLauncher;

impl ProcessLauncher for InstantLauncher {
    fn launch(&self, _invocation: &Invocation) -> io::Result<LaunchedProcess> {
        Ok(LaunchedProcess::new(
            Box::new(InstantChild),
            CapturedOutput::default(),
        ))
    }
}

struct ReadyProbe;

impl ReadinessProbe for ReadyProbe {
    fn probe(&self, _port: u16) -> Result<(), ProbeError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct CountingSignals {
    interrupts: Arc<AtomicUsize>,
}

impl ProcessSignals for CountingSignals {
    fn interrupt(&self, _pid: u32) -> Result<(), SignalError> {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn kill_tree(&self, _pid: u32) -> Result<(), SignalError> {
        Ok(())
    }
}

struct StubShutdown {
    fail: bool,
    waits: usize,
}

impl StubShutdown {
    fn new(fail: bool) -> Self {
        Self {
            fail,
            waits: 0,
        }
    }
}

impl ShutdownSignal for StubShutdown {
    fn wait(&mut self) -> Result<(), ShutdownError> {
        self.waits += 1;
        if self.fail {
            Err(ShutdownError::Install {
                source: io::Error::other("signal handler unavailable"),
            })
        } else {
            Ok(())
        }
    }
}

struct StubLoader {
    args: Vec<&'static str>,
}

impl ConfigLoader for StubLoader {
    fn load(&self, _args: Vec<OsString>) -> Result<Config, AppError> {
        Config::from_args(self.args.iter().map(OsString::from)).map_err(AppError::LoadConfiguration)
    }
}

type TestRunner = ServerRunner<InstantLauncher, ReadyProbe, CountingSignals>;

#[fixture]
fn signals() -> CountingSignals {
    CountingSignals::default()
}

fn runner(signals: &CountingSignals) -> TestRunner {
    let config = ServerConfig::new(18_090, 1_000).with_grace_period(Duration::from_millis(500));
    ServerRunner::with_parts(config, InstantLauncher, ReadyProbe, signals.clone())
}

#[rstest]
fn supervise_stops_the_server_after_shutdown(signals: CountingSignals) {
    let mut runner = runner(&signals);
    let mut shutdown = StubShutdown::new(false);

    supervise(&mut runner, &ProgramConfig::default(), "server --serve", &mut shutdown)
        .expect("supervision succeeds");

    assert_eq!(shutdown.waits, 1);
    assert_eq!(signals.interrupts.load(Ordering::SeqCst), 1);
    assert_eq!(runner.phase(), LifecyclePhase::Stopped);
    assert_eq!(runner.last_stop(), Some(StopOutcome::Exited));
}

#[rstest]
fn supervise_reports_start_failures_without_waiting(signals: CountingSignals) {
    let mut runner = runner(&signals);
    let mut shutdown = StubShutdown::new(false);

    let error = supervise(&mut runner, &ProgramConfig::default(), "  ", &mut shutdown)
        .expect_err("blank command fails");

    assert!(matches!(error, AppError::Start(RunnerError::EmptyCommand)));
    assert_eq!(error.to_string(), "failed to start server: run command is empty");
    assert_eq!(shutdown.waits, 0);
    assert_eq!(signals.interrupts.load(Ordering::SeqCst), 0);
}

#[rstest]
fn supervise_stops_the_server_when_the_shutdown_wait_fails(signals: CountingSignals) {
    let mut runner = runner(&signals);
    let mut shutdown = StubShutdown::new(true);

    let error = supervise(&mut runner, &ProgramConfig::default(), "server", &mut shutdown)
        .expect_err("shutdown wait fails");

    assert!(matches!(error, AppError::Shutdown(_)));
    assert_eq!(signals.interrupts.load(Ordering::SeqCst), 1);
    assert_eq!(runner.phase(), LifecyclePhase::Stopped);
}

#[rstest]
#[case(&["warden", "--program-env", "NO_SEPARATOR"], "invalid program environment entry")]
#[case(&["warden", "--port", "not-a-port"], "failed to load configuration")]
#[case(&["warden"], "failed to start server: run command is empty")]
fn run_reports_failures_on_stderr(#[case] args: &[&'static str], #[case] expected: &str) {
    let loader = StubLoader {
        args: args.to_vec(),
    };
    let mut shutdown = StubShutdown::new(false);
    let mut stderr = Vec::new();

    drop(run_with(Vec::<OsString>::new(), &mut stderr, &loader, &mut shutdown));

    let message = String::from_utf8(stderr).expect("stderr is utf-8");
    assert!(message.starts_with("warden: "), "unexpected prefix: {message}");
    assert!(message.contains(expected), "missing '{expected}' in: {message}");
    assert_eq!(shutdown.waits, 0);
}
