//! In-memory stand-ins for the HTTP statistics channel and the control utility.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::collector::fetch::FetchError;
use crate::collector::rndc::RndcError;
use crate::collector::traits::{CommandRunner, StatsSource};

/// Statistics source returning a canned body or failure.
#[derive(Debug, Clone)]
pub struct MockSource {
    response: Result<Vec<u8>, FetchError>,
    fetches: Arc<AtomicUsize>,
}

impl MockSource {
    /// Creates a source that always answers with `body`.
    pub fn with_body(body: impl Into<Vec<u8>>) -> Self {
        Self {
            response: Ok(body.into()),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a source that always fails with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self {
            response: Err(error),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of fetches served so far, shared between clones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl StatsSource for MockSource {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }

    fn describe(&self) -> &str {
        "mock://statistics"
    }
}

/// Command runner returning canned output and recording its invocations.
#[derive(Debug, Clone)]
pub struct MockRunner {
    response: Result<String, RndcError>,
    invocations: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
}

impl MockRunner {
    /// Creates a runner whose every invocation prints `output`.
    pub fn with_output(output: impl Into<String>) -> Self {
        Self {
            response: Ok(output.into()),
            invocations: Arc::default(),
        }
    }

    /// Creates a runner whose every invocation fails with `error`.
    pub fn failing(error: RndcError) -> Self {
        Self {
            response: Err(error),
            invocations: Arc::default(),
        }
    }

    /// Every `(program, args)` run so far, shared between clones.
    pub fn invocations(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.invocations
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &Path, args: &[&str], _timeout: Duration) -> Result<String, RndcError> {
        if let Ok(mut invocations) = self.invocations.lock() {
            invocations.push((
                program.to_path_buf(),
                args.iter().map(|a| a.to_string()).collect(),
            ));
        }
        self.response.clone()
    }
}
