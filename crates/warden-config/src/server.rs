//! Inputs consumed by the server lifecycle controller.
//!
//! [`ServerConfig`] describes where the managed server is expected to listen
//! and how long the controller waits for it. [`ProgramConfig`] carries the
//! extra arguments and environment overrides applied when it is spawned.
//! Both are plain values: the controller copies what it needs at start time
//! and never mutates them.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::defaults::{DEFAULT_GRACE_PERIOD, DEFAULT_PORT, DEFAULT_STARTUP_WAIT_MS};

/// Network expectations for a managed server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    port: u16,
    startup_wait_ms: u64,
    grace_period: Duration,
}

impl ServerConfig {
    /// Builds a configuration with the default grace period.
    #[must_use]
    pub const fn new(port: u16, startup_wait_ms: u64) -> Self {
        Self {
            port,
            startup_wait_ms,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Overrides the time allowed between the interrupt and a forced kill.
    #[must_use]
    pub const fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Port the server is expected to bind.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Startup-wait budget in milliseconds.
    #[must_use]
    pub const fn startup_wait_ms(&self) -> u64 {
        self.startup_wait_ms
    }

    /// Startup-wait budget as a [`Duration`].
    #[must_use]
    pub const fn startup_wait(&self) -> Duration {
        Duration::from_millis(self.startup_wait_ms)
    }

    /// Time allowed between the interrupt and a forced kill.
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        self.grace_period
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_STARTUP_WAIT_MS)
    }
}

/// Arguments and environment overrides applied to the spawned server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramConfig {
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl ProgramConfig {
    /// Builds a program configuration from its parts.
    #[must_use]
    pub const fn new(args: Vec<String>, env: BTreeMap<String, String>) -> Self {
        Self { args, env }
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds an environment override, replacing any earlier value for `key`.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Extra arguments appended after the run command's own arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Environment overrides applied on top of the inherited environment.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn server_config_defaults_to_two_second_grace() {
        let config = ServerConfig::new(9000, 1500);

        assert_eq!(config.port(), 9000);
        assert_eq!(config.startup_wait(), Duration::from_millis(1500));
        assert_eq!(config.grace_period(), Duration::from_secs(2));
    }

    #[rstest]
    fn grace_period_can_be_overridden() {
        let config = ServerConfig::default().with_grace_period(Duration::from_millis(250));

        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.grace_period(), Duration::from_millis(250));
    }

    #[rstest]
    fn program_config_preserves_argument_order() {
        let program = ProgramConfig::default()
            .with_arg("--first")
            .with_arg("--second")
            .with_env("MODE", "test");

        assert_eq!(program.args(), ["--first", "--second"]);
        assert_eq!(program.env().get("MODE").map(String::as_str), Some("test"));
    }
}
