//! Cucumber runner

use crate::error::{CliError, CliResult};
use sauceprobe::ProbeConfig;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Delegates a suite run to the external Cucumber executable
#[derive(Debug, Clone)]
pub struct CucumberRunner {
    config: ProbeConfig,
}

impl CucumberRunner {
    /// Runner for `config`
    #[must_use]
    pub const fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Use a different executable
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.config.cucumber_executable = executable.into();
        self
    }

    /// Program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.config.cucumber_executable
    }

    /// Default options followed by `extra`
    #[must_use]
    pub fn args(&self, extra: &[String]) -> Vec<String> {
        self.config.cucumber_args(extra)
    }

    /// Printable command line
    #[must_use]
    pub fn command_line(&self, extra: &[String]) -> String {
        std::iter::once(self.program().to_string())
            .chain(self.args(extra))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the suite with inherited stdio and return its exit code
    ///
    /// A child ended by a signal reports exit code 1.
    pub fn run(&self, extra: &[String]) -> CliResult<i32> {
        std::fs::create_dir_all(&self.config.report_dir)?;
        let args = self.args(extra);
        info!(program = self.program(), args = ?args, "starting cucumber");

        let status = Command::new(self.program())
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| {
                CliError::test_execution(format!("cannot start '{}': {e}", self.program()))
            })?;

        let code = status.code().unwrap_or(1);
        debug!(code, "cucumber exited");
        Ok(code)
    }
}
