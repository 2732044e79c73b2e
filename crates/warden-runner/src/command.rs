//! Builds the child process invocation from a run command.
//!
//! Splitting is literal: the command is broken on whitespace with no shell
//! quoting, so `"a b"` yields the two tokens `"a` and `b"`. Extra program
//! arguments are appended verbatim after the command's own arguments.

use std::ffi::OsString;

use warden_config::ProgramConfig;

use crate::environment::merge_environment;
use crate::error::RunnerError;

/// Fully resolved description of the process to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    env: Vec<(OsString, OsString)>,
}

impl Invocation {
    /// Resolves a run command against the program configuration.
    ///
    /// `ambient` is the environment inherited from the caller; the overrides
    /// from `program` are appended after it.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::EmptyCommand`] when `run_command` contains no
    /// tokens.
    pub fn resolve<I>(
        run_command: &str,
        program: &ProgramConfig,
        ambient: I,
    ) -> Result<Self, RunnerError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut tokens = run_command.split_whitespace();
        let executable = tokens.next().ok_or(RunnerError::EmptyCommand)?;
        let args = tokens
            .map(str::to_owned)
            .chain(program.args().iter().cloned())
            .collect();
        Ok(Self {
            program: executable.to_owned(),
            args,
            env: merge_environment(ambient, program.env()),
        })
    }

    /// Executable to launch.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Argument vector, excluding the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Complete environment handed to the child.
    #[must_use]
    pub fn env(&self) -> &[(OsString, OsString)] {
        &self.env
    }
}
