//! Command-line runtime for the `warden` server supervisor.
//!
//! A run loads layered configuration, installs telemetry, starts the
//! configured server, and keeps it alive until a termination signal arrives,
//! at which point the server is stopped gracefully (or killed once its grace
//! period runs out). Every failure is written to stderr and mapped to
//! [`ExitCode::FAILURE`].

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use tracing::info;
use warden_config::ProgramConfig;
use warden_runner::{ProcessLauncher, ProcessSignals, ReadinessProbe, ServerRunner};

mod config;
mod errors;
mod shutdown;
mod telemetry;

use config::{ConfigLoader, OrthoConfigLoader};
use errors::AppError;
use shutdown::{ShutdownSignal, SystemShutdownSignal};

const CLI_TARGET: &str = "warden_cli";

/// Runs the supervisor with the given arguments until shutdown.
///
/// The first argument is treated as the binary name.
#[must_use]
pub fn run<I, E>(args: I, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    E: Write,
{
    match SystemShutdownSignal::install() {
        Ok(mut shutdown) => run_with(args, stderr, &OrthoConfigLoader, &mut shutdown),
        Err(error) => report(stderr, &AppError::from(error)),
    }
}

pub(crate) fn run_with<I, E, L, Sh>(
    args: I,
    stderr: &mut E,
    loader: &L,
    shutdown: &mut Sh,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    E: Write,
    L: ConfigLoader,
    Sh: ShutdownSignal,
{
    let result = loader.load(args.into_iter().collect()).and_then(|config| {
        telemetry::initialise(&config)?;
        let program = config.program_config()?;
        let mut runner = ServerRunner::new(config.server_config());
        supervise(&mut runner, &program, config.run_command(), shutdown)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(stderr, &error),
    }
}

/// Starts the server, blocks until `shutdown` fires, then stops it.
///
/// A failed start still calls `stop` so a process left behind by a startup
/// timeout is reclaimed before the error is reported.
pub(crate) fn supervise<L, P, S, Sh>(
    runner: &mut ServerRunner<L, P, S>,
    program: &ProgramConfig,
    run_command: &str,
    shutdown: &mut Sh,
) -> Result<(), AppError>
where
    L: ProcessLauncher,
    P: ReadinessProbe,
    S: ProcessSignals,
    Sh: ShutdownSignal + ?Sized,
{
    if let Err(error) = runner.start(program, run_command) {
        runner.stop();
        return Err(AppError::Start(error));
    }

    info!(
        target: CLI_TARGET,
        pid = runner.pid(),
        port = runner.port(),
        "server running; waiting for shutdown signal"
    );
    let waited = shutdown.wait();
    runner.stop();
    waited.map_err(AppError::from)
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    drop(writeln!(stderr, "warden: {error}"));
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests;
