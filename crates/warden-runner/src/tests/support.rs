//! Fakes standing in for real processes, probes, and signals.

use std::io;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use mockall::mock;

use crate::{
    CapturedOutput, ChildProcess, Invocation, LaunchedProcess, ProbeError, ProcessLauncher,
    ProcessSignals, ReadinessProbe, SignalError,
};

pub const FAKE_PID: u32 = 4242;

mock! {
    pub Signals {}
    impl ProcessSignals for Signals {
        fn interrupt(&self, pid: u32) -> Result<(), SignalError>;
        fn kill_tree(&self, pid: u32) -> Result<(), SignalError>;
    }
}

#[cfg(unix)]
fn success() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}

#[cfg(windows)]
fn success() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(0)
}

/// Shared switch that releases a [`FakeChild`] blocked in `wait`.
#[derive(Clone, Default)]
pub struct ExitHandle(Arc<(Mutex<bool>, Condvar)>);

impl ExitHandle {
    pub fn exit(&self) {
        let (lock, cvar) = &*self.0;
        *lock.lock().expect("exit mutex poisoned") = true;
        cvar.notify_all();
    }

    pub fn has_exited(&self) -> bool {
        let (lock, _) = &*self.0;
        *lock.lock().expect("exit mutex poisoned")
    }

    fn wait(&self) {
        let (lock, cvar) = &*self.0;
        let mut exited = lock.lock().expect("exit mutex poisoned");
        while !*exited {
            exited = cvar.wait(exited).expect("exit mutex poisoned during wait");
        }
    }
}

pub struct FakeChild {
    pid: Option<u32>,
    exit: ExitHandle,
}

impl ChildProcess for FakeChild {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        self.exit.wait();
        Ok(success())
    }
}

/// Launcher recording every invocation it is asked to spawn.
#[derive(Clone)]
pub struct FakeLauncher {
    pid: Option<u32>,
    failure: Option<io::ErrorKind>,
    exit: ExitHandle,
    launches: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeLauncher {
    pub fn spawning(exit: ExitHandle) -> Self {
        Self {
            pid: Some(FAKE_PID),
            failure: None,
            exit,
            launches: Arc::default(),
        }
    }

    pub fn without_pid() -> Self {
        Self {
            pid: None,
            ..Self::spawning(ExitHandle::default())
        }
    }

    pub fn failing(kind: io::ErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::spawning(ExitHandle::default())
        }
    }

    pub fn launches(&self) -> Vec<Invocation> {
        self.launches.lock().expect("launch log poisoned").clone()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, invocation: &Invocation) -> io::Result<LaunchedProcess> {
        self.launches
            .lock()
            .expect("launch log poisoned")
            .push(invocation.clone());
        if let Some(kind) = self.failure {
            return Err(io::Error::new(kind, "simulated spawn failure"));
        }
        let child = FakeChild {
            pid: self.pid,
            exit: self.exit.clone(),
        };
        Ok(LaunchedProcess::new(Box::new(child), CapturedOutput::default()))
    }
}

/// Probe that answers after a fixed number of refusals, or never.
#[derive(Clone)]
pub struct FakeProbe {
    refusals: Option<usize>,
    calls: Arc<AtomicUsize>,
}

impl FakeProbe {
    pub fn ready_after(refusals: usize) -> Self {
        Self {
            refusals: Some(refusals),
            calls: Arc::default(),
        }
    }

    pub fn never_ready() -> Self {
        Self {
            refusals: None,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReadinessProbe for FakeProbe {
    fn probe(&self, _port: u16) -> Result<(), ProbeError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.refusals {
            Some(refusals) if attempt >= refusals => Ok(()),
            _ => Err(ProbeError::Unreachable {
                message: "connection refused".into(),
            }),
        }
    }
}

/// Signal sink that counts deliveries and optionally ignores interrupts.
#[derive(Clone)]
pub struct RecordingSignals {
    honours_interrupt: bool,
    exit: ExitHandle,
    interrupts: Arc<AtomicUsize>,
    kills: Arc<AtomicUsize>,
}

impl RecordingSignals {
    pub fn new(exit: ExitHandle, honours_interrupt: bool) -> Self {
        Self {
            honours_interrupt,
            exit,
            interrupts: Arc::default(),
            kills: Arc::default(),
        }
    }

    pub fn interrupts(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }
}

impl ProcessSignals for RecordingSignals {
    fn interrupt(&self, _pid: u32) -> Result<(), SignalError> {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
        if self.honours_interrupt {
            self.exit.exit();
        }
        Ok(())
    }

    fn kill_tree(&self, _pid: u32) -> Result<(), SignalError> {
        self.kills.fetch_add(1, Ordering::SeqCst);
        self.exit.exit();
        Ok(())
    }
}
