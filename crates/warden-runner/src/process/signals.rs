//! Per-platform delivery of interrupt and process-tree kill signals.
//!
//! The controller only ever asks for two things: a graceful interrupt aimed
//! at the server process, and a forced kill aimed at the whole process tree
//! it leads. [`ProcessSignals`] captures exactly that so the lifecycle logic
//! stays platform-neutral and tests can substitute a recording sink.

use crate::error::SignalError;

/// Signal sink targeting a process by identity.
pub trait ProcessSignals {
    /// Requests a graceful shutdown of the process (SIGINT on Unix).
    ///
    /// # Errors
    ///
    /// Returns a [`SignalError`] when the signal cannot be delivered. A target
    /// that has already exited is not an error.
    fn interrupt(&self, pid: u32) -> Result<(), SignalError>;

    /// Forcibly terminates the process and every member of its process group.
    ///
    /// # Errors
    ///
    /// Returns a [`SignalError`] when the kill cannot be delivered. A target
    /// that has already exited is not an error.
    fn kill_tree(&self, pid: u32) -> Result<(), SignalError>;
}

/// Operating-system signal delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSignals;

#[cfg(unix)]
mod platform {
    use std::io;

    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill, killpg};
    use nix::unistd::Pid;
    use tracing::debug;

    use super::{ProcessSignals, SignalError, SystemSignals};
    use crate::process::PROCESS_TARGET;

    fn to_pid(pid: u32) -> Result<Pid, SignalError> {
        i32::try_from(pid)
            .map(Pid::from_raw)
            .map_err(|_| SignalError::InvalidPid { pid })
    }

    fn delivered(
        pid: u32,
        signal: &'static str,
        result: nix::Result<()>,
    ) -> Result<(), SignalError> {
        match result {
            Ok(()) => {
                debug!(target: PROCESS_TARGET, pid, signal, "signal delivered");
                Ok(())
            }
            Err(Errno::ESRCH) => {
                debug!(target: PROCESS_TARGET, pid, signal, "process already exited");
                Ok(())
            }
            Err(errno) => Err(SignalError::Delivery {
                pid,
                signal,
                source: io::Error::from(errno),
            }),
        }
    }

    impl ProcessSignals for SystemSignals {
        fn interrupt(&self, pid: u32) -> Result<(), SignalError> {
            let target = to_pid(pid)?;
            delivered(pid, "SIGINT", kill(target, Signal::SIGINT))
        }

        fn kill_tree(&self, pid: u32) -> Result<(), SignalError> {
            // The server leads its own process group, so its pid is the pgid.
            let group = to_pid(pid)?;
            delivered(pid, "SIGKILL", killpg(group, Signal::SIGKILL))
        }
    }
}

#[cfg(windows)]
mod platform {
    use std::io;
    use std::process::{Command, Stdio};

    use super::{ProcessSignals, SignalError, SystemSignals};

    impl ProcessSignals for SystemSignals {
        fn interrupt(&self, _pid: u32) -> Result<(), SignalError> {
            Err(SignalError::Unsupported { signal: "interrupt" })
        }

        fn kill_tree(&self, pid: u32) -> Result<(), SignalError> {
            let status = Command::new("taskkill")
                .args(["/T", "/F", "/PID", &pid.to_string()])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map_err(|source| SignalError::Delivery {
                    pid,
                    signal: "taskkill",
                    source,
                })?;
            if status.success() {
                Ok(())
            } else {
                Err(SignalError::Delivery {
                    pid,
                    signal: "taskkill",
                    source: io::Error::other(format!("taskkill exited with {status}")),
                })
            }
        }
    }
}
