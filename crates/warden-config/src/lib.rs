//! Shared configuration for the Warden server runner.
//!
//! [`Config`] is loaded through `ortho_config`, layering defaults, an
//! optional `.warden.toml` file, `WARDEN_*` environment variables, and CLI
//! flags (later layers win). The loaded values are converted into the plain
//! [`ServerConfig`] and [`ProgramConfig`] inputs consumed by the lifecycle
//! controller in `warden-runner`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod defaults;
mod environment;
mod logging;
mod server;

pub use defaults::{
    DEFAULT_GRACE_PERIOD, DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_STARTUP_WAIT_MS,
    default_log_filter, default_log_format,
};
pub use environment::{EnvEntry, EnvEntryParseError};
pub use logging::LogFormat;
pub use server::{ProgramConfig, ServerConfig};

/// Errors raised while deriving runner inputs from loaded configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A `program_env` entry was not a valid `KEY=VALUE` pair.
    #[error("invalid program environment entry: {source}")]
    InvalidEnvEntry {
        /// Underlying parse error.
        #[source]
        source: EnvEntryParseError,
    },
}

/// Layered configuration for the `warden` binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WARDEN")]
#[serde(default)]
pub struct Config {
    /// Whitespace-delimited command line used to launch the server.
    run_command: Option<String>,
    /// Port the server is expected to bind.
    port: Option<u16>,
    /// Milliseconds to wait for the server to answer its readiness probe.
    startup_wait_ms: Option<u64>,
    /// Milliseconds between the interrupt signal and a forced kill.
    grace_period_ms: Option<u64>,
    /// Extra arguments appended after the run command's own arguments.
    program_args: Vec<String>,
    /// `KEY=VALUE` overrides applied on top of the inherited environment.
    program_env: Vec<String>,
    /// Tracing filter expression.
    log_filter: Option<String>,
    /// Tracing output format.
    log_format: Option<LogFormat>,
}

impl Config {
    /// Loads configuration using `args` in place of the process arguments.
    ///
    /// The first item is treated as the binary name.
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when any layer fails to parse.
    pub fn from_args<I>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::load_from_iter(args)
    }

    /// Command line used to launch the server; empty when unset.
    #[must_use]
    pub fn run_command(&self) -> &str {
        self.run_command.as_deref().unwrap_or_default()
    }

    /// Port the server is expected to bind.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Startup-wait budget in milliseconds.
    #[must_use]
    pub fn startup_wait_ms(&self) -> u64 {
        self.startup_wait_ms.unwrap_or(DEFAULT_STARTUP_WAIT_MS)
    }

    /// Grace period between the interrupt signal and a forced kill.
    #[must_use]
    pub fn grace_period(&self) -> Duration {
        self.grace_period_ms
            .map_or(DEFAULT_GRACE_PERIOD, Duration::from_millis)
    }

    /// Extra arguments appended to the run command.
    #[must_use]
    pub fn program_args(&self) -> &[String] {
        &self.program_args
    }

    /// Raw `KEY=VALUE` environment overrides.
    #[must_use]
    pub fn program_env(&self) -> &[String] {
        &self.program_env
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Tracing output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Network expectations handed to the lifecycle controller.
    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.port(), self.startup_wait_ms()).with_grace_period(self.grace_period())
    }

    /// Arguments and environment overrides handed to the lifecycle controller.
    ///
    /// Later entries for the same variable replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvEntry`] when an entry is not a
    /// `KEY=VALUE` pair.
    pub fn program_config(&self) -> Result<ProgramConfig, ConfigError> {
        let mut env = BTreeMap::new();
        for raw in &self.program_env {
            let entry: EnvEntry = raw
                .parse()
                .map_err(|source| ConfigError::InvalidEnvEntry { source })?;
            env.insert(entry.key, entry.value);
        }
        Ok(ProgramConfig::new(self.program_args.clone(), env))
    }
}
