//! Graceful-then-forced termination of the managed server.
//!
//! Stopping races two waiters against each other: a thread blocked on the
//! child's exit status, and the grace-period deadline of a single-slot
//! channel receive. Whichever resolves first decides the follow-up, so
//! exactly one of "observe the exit" or "kill the process tree" happens.

use std::io;
use std::process::ExitStatus;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::process::{ChildProcess, ProcessSignals};

pub(crate) const LIFECYCLE_TARGET: &str = "warden_runner::lifecycle";

/// How long to wait for the reaped status after a forced kill.
pub const REAP_TIMEOUT: Duration = Duration::from_millis(500);

/// How a stop concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The process exited within the grace period.
    Exited,
    /// The grace period elapsed and the process tree was killed.
    Killed,
}

/// Interrupts `child`, waits up to `grace` for it to exit, then kills its
/// process tree.
pub(crate) fn terminate<S>(
    signals: &S,
    mut child: Box<dyn ChildProcess>,
    pid: u32,
    grace: Duration,
) -> StopOutcome
where
    S: ProcessSignals + ?Sized,
{
    if let Err(error) = signals.interrupt(pid) {
        warn!(
            target: LIFECYCLE_TARGET,
            pid,
            error = %error,
            "failed to interrupt server"
        );
    }

    let (sender, receiver) = mpsc::sync_channel(1);
    let waiter = thread::Builder::new()
        .name("warden-exit-wait".into())
        .spawn(move || drop(sender.send(child.wait())));
    if let Err(error) = waiter {
        warn!(
            target: LIFECYCLE_TARGET,
            pid,
            error = %error,
            "failed to start exit waiter; killing server"
        );
        kill(signals, pid);
        return StopOutcome::Killed;
    }

    match receiver.recv_timeout(grace) {
        Ok(result) => {
            log_exit(pid, &result);
            StopOutcome::Exited
        }
        Err(RecvTimeoutError::Timeout) => {
            info!(
                target: LIFECYCLE_TARGET,
                pid,
                grace_ms = grace.as_millis(),
                "grace period elapsed; killing server"
            );
            kill(signals, pid);
            reap(&receiver, pid);
            StopOutcome::Killed
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!(target: LIFECYCLE_TARGET, pid, "exit waiter vanished; killing server");
            kill(signals, pid);
            StopOutcome::Killed
        }
    }
}

fn kill<S>(signals: &S, pid: u32)
where
    S: ProcessSignals + ?Sized,
{
    if let Err(error) = signals.kill_tree(pid) {
        warn!(
            target: LIFECYCLE_TARGET,
            pid,
            error = %error,
            "failed to kill server process tree"
        );
    }
}

fn reap(receiver: &Receiver<io::Result<ExitStatus>>, pid: u32) {
    match receiver.recv_timeout(REAP_TIMEOUT) {
        Ok(result) => log_exit(pid, &result),
        Err(_) => warn!(
            target: LIFECYCLE_TARGET,
            pid,
            "server not reaped after kill"
        ),
    }
}

fn log_exit(pid: u32, result: &io::Result<ExitStatus>) {
    match result {
        Ok(status) => debug!(target: LIFECYCLE_TARGET, pid, %status, "server exited"),
        Err(error) => warn!(
            target: LIFECYCLE_TARGET,
            pid,
            error = %error,
            "failed to collect server exit status"
        ),
    }
}
