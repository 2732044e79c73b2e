use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Single `KEY=VALUE` environment override supplied through configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    /// Variable name.
    pub key: String,
    /// Variable value; may be empty.
    pub value: String,
}

/// Errors produced when parsing [`EnvEntry`] values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvEntryParseError {
    /// The `=` separator was missing.
    #[error("environment override '{0}' is missing the '=' separator")]
    MissingSeparator(String),
    /// The variable name before `=` was empty.
    #[error("environment override '{0}' has an empty variable name")]
    EmptyKey(String),
}

impl FromStr for EnvEntry {
    type Err = EnvEntryParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (key, value) = input
            .split_once('=')
            .ok_or_else(|| EnvEntryParseError::MissingSeparator(input.to_owned()))?;
        if key.is_empty() {
            return Err(EnvEntryParseError::EmptyKey(input.to_owned()));
        }
        Ok(Self {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }
}

impl fmt::Display for EnvEntry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}={}", self.key, self.value)
    }
}
