//! Metric records and the per-pass working map they are accumulated in.

use std::collections::HashMap;
use std::fmt;

use chrono::Utc;
use serde::Serialize;

/// Value of a single metric.
///
/// Counters read from the statistics document are kept exactly as the name
/// server printed them; only defaults and aggregated sums are integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    /// Byte counts, which the name server reports as unsigned 64-bit.
    Unsigned(u64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Unsigned(v) => write!(f, "{}", v),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::Unsigned(v)
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        MetricValue::Text(s.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(s: String) -> Self {
        MetricValue::Text(s)
    }
}

/// A metric as it is handed to a [`MetricSink`](crate::sink::MetricSink).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub key: String,
    pub value: MetricValue,
    pub host: String,
    /// UNIX seconds at the moment the record was built.
    pub clock: i64,
}

impl MetricRecord {
    /// Builds a record stamped with the current time.
    pub fn new(key: impl Into<String>, value: impl Into<MetricValue>, host: &str) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            host: host.to_string(),
            clock: Utc::now().timestamp(),
        }
    }
}

/// Formats a bracketed metric key: `namespace[dim1,dim2,...]`.
pub fn item_key(namespace: &str, dims: &[&str]) -> String {
    format!("{}[{}]", namespace, dims.join(","))
}

/// Working map of metrics produced by one extraction pass.
///
/// Keys keep the order of their first insertion; inserting an existing key
/// replaces its value in place (last write wins).
#[derive(Debug, Clone, Default)]
pub struct MetricBatch {
    entries: Vec<(String, MetricValue)>,
    index: HashMap<String, usize>,
}

impl MetricBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a metric.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetricValue>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Stamps every entry with `host` and the current time.
    pub fn into_records(self, host: &str) -> Vec<MetricRecord> {
        self.entries
            .into_iter()
            .map(|(key, value)| MetricRecord::new(key, value, host))
            .collect()
    }
}
