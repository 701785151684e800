//! Abstractions over the two blocking inputs of a poll cycle.
//!
//! `StatsSource` and `CommandRunner` let the collector work against a real
//! name server or against canned responses in tests.

use std::path::Path;
use std::time::Duration;

use crate::collector::fetch::FetchError;
use crate::collector::rndc::RndcError;

/// Source of the raw statistics document.
pub trait StatsSource: Send + Sync {
    /// Fetches the raw response body.
    fn fetch(&self) -> Result<Vec<u8>, FetchError>;

    /// Human readable location, used in log messages.
    fn describe(&self) -> &str;
}

/// Executes an external program and captures its output.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, returning merged stdout and stderr.
    ///
    /// # Arguments
    /// * `program` - Path to the executable
    /// * `args` - Command line arguments
    /// * `timeout` - Upper bound for the whole run; the child is killed when it expires
    fn run(&self, program: &Path, args: &[&str], timeout: Duration) -> Result<String, RndcError>;
}
