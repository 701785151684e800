//! Metrics from the control utility's `status` command.

pub mod parser;
pub mod runner;

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::collector::traits::CommandRunner;

pub use parser::{StatusLine, StatusReport, parse_line, parse_status};
pub use runner::ProcessRunner;

/// Error type for the rndc pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RndcError {
    /// The program could not be started (missing, not executable, ...).
    Launch { program: String, reason: String },
    /// The program did not finish within the timeout and was killed.
    Timeout(Duration),
    /// Reading the program's output failed.
    Io(String),
    /// The output contained an error line.
    Output(String),
}

impl std::fmt::Display for RndcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RndcError::Launch { program, reason } => {
                write!(f, "can not exec \"{} status\": {}", program, reason)
            }
            RndcError::Timeout(t) => write!(f, "rndc did not finish within {:?}", t),
            RndcError::Io(msg) => write!(f, "I/O error reading rndc output: {}", msg),
            RndcError::Output(line) => write!(f, "rndc exec error [{}]", line),
        }
    }
}

impl std::error::Error for RndcError {}

/// Runs `{rndc_path} status` and parses its output.
pub struct RndcCollector<R: CommandRunner> {
    runner: R,
    rndc_path: Option<PathBuf>,
    timeout: Duration,
}

impl<R: CommandRunner> RndcCollector<R> {
    /// Creates a new rndc collector.
    ///
    /// # Arguments
    /// * `runner` - Process runner (real or mock)
    /// * `rndc_path` - Path to the control utility; `None` disables the pass
    /// * `timeout` - Upper bound for one invocation
    pub fn new(runner: R, rndc_path: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            runner,
            rndc_path,
            timeout,
        }
    }

    /// Collects one status report.
    ///
    /// Without a configured path this is a no-op that returns an empty
    /// report. Launch failures and timeouts are returned as errors; an error
    /// line in the output is reported inside the [`StatusReport`] alongside
    /// the metrics parsed before it.
    pub fn collect(&self) -> Result<StatusReport, RndcError> {
        let Some(ref path) = self.rndc_path else {
            debug!("rndc path not configured, skipping status");
            return Ok(StatusReport::default());
        };

        let output = self.runner.run(path, &["status"], self.timeout)?;
        Ok(parse_status(&output))
    }
}
