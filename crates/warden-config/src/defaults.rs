use std::time::Duration;

use crate::logging::LogFormat;

/// Port probed when no port is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Startup-wait budget applied when none is configured.
pub const DEFAULT_STARTUP_WAIT_MS: u64 = 10_000;

/// Time a server is given to exit after the interrupt signal.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
