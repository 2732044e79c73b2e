//! HTTP readiness probing.
//!
//! A server counts as ready once anything answers a plain GET on
//! `http://localhost:<port>/`; the status code is ignored. Connection
//! failures are retried until the startup deadline passes.

use std::thread;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::error::RunnerError;

const PROBE_TARGET: &str = "warden_runner::probe";

/// Upper bound on a single readiness request.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Pause between failed readiness requests.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Outcome of a failed probe attempt.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request or client could not be built. Never retried.
    #[error("{message}")]
    Construction {
        /// Description of the construction failure.
        message: String,
    },

    /// The server did not answer. Retried until the deadline.
    #[error("server not reachable: {message}")]
    Unreachable {
        /// Description of the transport failure.
        message: String,
    },
}

/// Checks whether a server is accepting requests on a port.
pub trait ReadinessProbe {
    /// Performs one readiness check against `port`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Unreachable`] when the server did not answer and
    /// [`ProbeError::Construction`] when no request could be issued at all.
    fn probe(&self, port: u16) -> Result<(), ProbeError>;
}

/// Readiness probe issuing blocking HTTP GET requests.
#[derive(Debug)]
pub struct HttpProbe {
    timeout: Duration,
    client: OnceCell<Client>,
}

impl HttpProbe {
    /// Creates a probe whose requests give up after `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client, ProbeError> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .timeout(self.timeout)
                .no_proxy()
                .build()
                .map_err(|error| ProbeError::Construction {
                    message: error.to_string(),
                })
        })
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new(PROBE_TIMEOUT)
    }
}

impl ReadinessProbe for HttpProbe {
    fn probe(&self, port: u16) -> Result<(), ProbeError> {
        let url = Url::parse(&format!("http://localhost:{port}/")).map_err(|error| {
            ProbeError::Construction {
                message: error.to_string(),
            }
        })?;
        let response = self
            .client()?
            .get(url)
            .send()
            .map_err(|error| ProbeError::Unreachable {
                message: error.to_string(),
            })?;
        debug!(
            target: PROBE_TARGET,
            port,
            status = response.status().as_u16(),
            "readiness probe answered"
        );
        drop(response);
        Ok(())
    }
}

/// Polls `probe` until it succeeds or `startup_wait` elapses.
///
/// The deadline is only checked before each attempt, so a slow final probe
/// may overrun it by up to one probe timeout.
pub(crate) fn await_ready<P>(probe: &P, port: u16, startup_wait: Duration) -> Result<(), RunnerError>
where
    P: ReadinessProbe + ?Sized,
{
    let deadline = Instant::now() + startup_wait;
    let mut attempt: u32 = 0;
    while Instant::now() < deadline {
        attempt = attempt.saturating_add(1);
        match probe.probe(port) {
            Ok(()) => {
                debug!(target: PROBE_TARGET, port, attempt, "server is ready");
                return Ok(());
            }
            Err(ProbeError::Construction { message }) => {
                return Err(RunnerError::ProbeConstructionFailed { message });
            }
            Err(ProbeError::Unreachable { message }) => {
                debug!(target: PROBE_TARGET, port, attempt, reason = %message, "server not ready");
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
    Err(RunnerError::StartupTimeout {
        wait_ms: u64::try_from(startup_wait.as_millis()).unwrap_or(u64::MAX),
    })
}
