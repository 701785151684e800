//! Parser for `rndc status` output.
//!
//! ```text
//! version: 9.8
//! CPUs found: 2
//! worker threads: 2
//! number of zones: 1
//! debug level: 0
//! xfers running: 0
//! xfers deferred: 0
//! soa queries in progress: 0
//! query logging is OFF
//! recursive clients: 0/0/1000
//! tcp clients: 0/100
//! server is up and running
//! ```
//!
//! Each line goes through an ordered list of matchers: a `key: value` split,
//! then two free-text patterns. Lines nothing matches are dropped.

use std::sync::LazyLock;

use regex::Regex;

use super::RndcError;
use crate::model::{MetricBatch, item_key};

/// Namespace of every rndc metric.
pub const RNDC_NAMESPACE: &str = "named.rndc";

/// Any line containing this marker aborts the parse.
const ERROR_MARKER: &str = "error";

/// Fields whose value is a `/`-separated tuple, with the metric name of each part.
const COMPOUND_FIELDS: &[(&str, &[&str])] = &[
    (
        "recursive clients",
        &[
            "recursive_clients_used",
            "recursive_clients_soft",
            "recursive_clients_max",
        ],
    ),
    ("tcp clients", &["tcp_clients_used", "tcp_clients_max"]),
];

/// Free-text lines, tried in order when the line is not a `key: value` pair.
static LINE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("query_logging", r"^query logging is (\w+)"),
        ("server_is", r"^server is (.*)"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid status pattern")))
    .collect()
});

/// Result of parsing one status line.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLine {
    /// One or more `(name, value)` fields.
    Fields(Vec<(String, String)>),
    /// The line reports an error; nothing after it is trusted.
    Error,
    /// Nothing matched.
    Dropped,
}

/// Metrics parsed from one invocation, plus the error that cut it short.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    /// Metrics from every line before the first error line.
    pub metrics: MetricBatch,
    pub error: Option<RndcError>,
}

/// Classifies a single line (trailing whitespace already removed).
pub fn parse_line(line: &str) -> StatusLine {
    if line.contains(ERROR_MARKER) {
        return StatusLine::Error;
    }
    if let Some(fields) = parse_key_value(line) {
        return StatusLine::Fields(fields);
    }
    match_patterns(line)
        .map(|field| StatusLine::Fields(vec![field]))
        .unwrap_or(StatusLine::Dropped)
}

/// Parses a whole status report.
///
/// Parsing stops at the first error line. Metrics from earlier lines are
/// kept in the report.
pub fn parse_status(output: &str) -> StatusReport {
    let mut report = StatusReport::default();

    for line in output.lines().map(str::trim_end) {
        match parse_line(line) {
            StatusLine::Fields(fields) => {
                for (name, value) in fields {
                    let key = item_key(RNDC_NAMESPACE, &[name.as_str()]);
                    report.metrics.insert(key, value);
                }
            }
            StatusLine::Error => {
                report.error = Some(RndcError::Output(line.to_string()));
                break;
            }
            StatusLine::Dropped => {}
        }
    }

    report
}

/// `key: value` with exactly one colon.
fn parse_key_value(line: &str) -> Option<Vec<(String, String)>> {
    let mut parts = line.split(':');
    let (key, value) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let value = value.trim_start();

    match COMPOUND_FIELDS.iter().find(|(name, _)| *name == key) {
        Some((_, names)) => split_compound(value, names),
        None => Some(vec![(key.replace(' ', "_"), value.to_string())]),
    }
}

/// Splits `a/b/c` into one field per name; `None` if the arity differs.
fn split_compound(value: &str, names: &[&str]) -> Option<Vec<(String, String)>> {
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() != names.len() {
        return None;
    }
    Some(
        names
            .iter()
            .zip(parts)
            .map(|(name, part)| (name.to_string(), part.to_string()))
            .collect(),
    )
}

fn match_patterns(line: &str) -> Option<(String, String)> {
    LINE_PATTERNS.iter().find_map(|(name, re)| {
        re.captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| (name.to_string(), m.as_str().to_string()))
    })
}
