//! Configuration loading seam for the CLI runtime.

use std::ffi::OsString;

use warden_config::Config;

use crate::errors::AppError;

/// Source of the layered configuration for one CLI run.
pub(crate) trait ConfigLoader {
    /// Loads configuration, treating the first argument as the binary name.
    fn load(&self, args: Vec<OsString>) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: Vec<OsString>) -> Result<Config, AppError> {
        Config::from_args(args).map_err(AppError::LoadConfiguration)
    }
}
