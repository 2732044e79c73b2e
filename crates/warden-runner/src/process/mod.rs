//! Spawning and signalling of the managed server process.
//!
//! [`ProcessLauncher`] turns an [`Invocation`] into a running child. The
//! system implementation places the child in its own process group so the
//! whole tree it spawns can be killed at once, and drains both standard
//! streams into a [`CapturedOutput`].

mod output;
mod signals;

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};

pub use self::output::CapturedOutput;
pub use self::signals::{ProcessSignals, SystemSignals};
use crate::command::Invocation;

/// Tracing target for process spawning and signalling.
pub(crate) const PROCESS_TARGET: &str = "warden_runner::process";

/// Handle to a spawned child process.
pub trait ChildProcess: Send {
    /// Operating-system process identifier, when the process is still known.
    fn id(&self) -> Option<u32>;

    /// Blocks until the process exits and returns its status.
    ///
    /// # Errors
    ///
    /// Propagates the OS error when the exit status cannot be collected.
    fn wait(&mut self) -> io::Result<ExitStatus>;
}

impl ChildProcess for Child {
    fn id(&self) -> Option<u32> {
        Some(Child::id(self))
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        Child::wait(self)
    }
}

/// A freshly spawned child together with its captured output.
pub struct LaunchedProcess {
    child: Box<dyn ChildProcess>,
    output: CapturedOutput,
}

impl LaunchedProcess {
    /// Pairs a child handle with the output buffers being filled for it.
    #[must_use]
    pub const fn new(child: Box<dyn ChildProcess>, output: CapturedOutput) -> Self {
        Self { child, output }
    }

    pub(crate) fn into_parts(self) -> (Box<dyn ChildProcess>, CapturedOutput) {
        (self.child, self.output)
    }
}

impl std::fmt::Debug for LaunchedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchedProcess")
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

/// Abstraction over process creation so lifecycle logic can be exercised
/// without spawning real servers.
pub trait ProcessLauncher {
    /// Spawns the process described by `invocation`.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the process cannot be created.
    fn launch(&self, invocation: &Invocation) -> io::Result<LaunchedProcess>;
}

/// Launches servers as real operating-system processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, invocation: &Invocation) -> io::Result<LaunchedProcess> {
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.args())
            .env_clear()
            .envs(invocation.env().iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        isolate_process_group(&mut command);

        let mut child = command.spawn()?;
        let output = CapturedOutput::default();
        output.capture(child.stdout.take(), child.stderr.take());
        Ok(LaunchedProcess::new(Box::new(child), output))
    }
}

#[cfg(unix)]
fn isolate_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
}

#[cfg(windows)]
fn isolate_process_group(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn isolate_process_group(_command: &mut Command) {}
