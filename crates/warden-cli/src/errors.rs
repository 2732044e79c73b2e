//! Error types for the CLI runtime.

use std::sync::Arc;

use thiserror::Error;
use warden_config::ConfigError;
use warden_runner::RunnerError;

use crate::shutdown::ShutdownError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to start server: {0}")]
    Start(#[source] RunnerError),
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}
