//! Destinations for produced records.
//!
//! The collector never blocks on a sink: a full queue rejects the record and
//! the caller moves on.

use std::sync::Mutex;

use flume::{Sender, TrySendError};
use serde::Serialize;

use crate::model::{DiscoveryRecord, MetricRecord};

/// Error returned when a sink refuses a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The queue is at capacity.
    Full,
    /// The consuming side has gone away.
    Disconnected,
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Full => write!(f, "queue is full"),
            SinkError::Disconnected => write!(f, "queue consumer disconnected"),
        }
    }
}

impl std::error::Error for SinkError {}

impl<T> From<TrySendError<T>> for SinkError {
    fn from(e: TrySendError<T>) -> Self {
        match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Disconnected(_) => SinkError::Disconnected,
        }
    }
}

/// Receives metric records.
pub trait MetricSink: Send + Sync {
    fn push(&self, record: MetricRecord) -> Result<(), SinkError>;
}

/// Receives discovery records.
pub trait DiscoverySink: Send + Sync {
    fn push(&self, record: DiscoveryRecord) -> Result<(), SinkError>;
}

/// Anything that travels through a [`QueueSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueueItem {
    Metric(MetricRecord),
    Discovery(DiscoveryRecord),
}

/// Bounded channel sink shared by metrics and discovery.
///
/// Uses `try_send`, so a full channel is reported as [`SinkError::Full`]
/// instead of stalling the poll loop.
#[derive(Debug, Clone)]
pub struct QueueSink {
    tx: Sender<QueueItem>,
}

impl QueueSink {
    pub fn new(tx: Sender<QueueItem>) -> Self {
        Self { tx }
    }
}

impl MetricSink for QueueSink {
    fn push(&self, record: MetricRecord) -> Result<(), SinkError> {
        self.tx.try_send(QueueItem::Metric(record))?;
        Ok(())
    }
}

impl DiscoverySink for QueueSink {
    fn push(&self, record: DiscoveryRecord) -> Result<(), SinkError> {
        self.tx.try_send(QueueItem::Discovery(record))?;
        Ok(())
    }
}

/// Sink that keeps everything in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    metrics: Mutex<Vec<MetricRecord>>,
    discovery: Mutex<Vec<DiscoveryRecord>>,
    capacity: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that rejects records once `capacity` metrics are held.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn metrics(&self) -> Vec<MetricRecord> {
        self.metrics.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn discovery(&self) -> Vec<DiscoveryRecord> {
        self.discovery.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Value of the last metric pushed under `key`, rendered as text.
    pub fn value(&self, key: &str) -> Option<String> {
        self.metrics()
            .iter()
            .rev()
            .find(|r| r.key == key)
            .map(|r| r.value.to_string())
    }
}

impl MetricSink for RecordingSink {
    fn push(&self, record: MetricRecord) -> Result<(), SinkError> {
        let mut metrics = self.metrics.lock().map_err(|_| SinkError::Disconnected)?;
        if self.capacity.is_some_and(|cap| metrics.len() >= cap) {
            return Err(SinkError::Full);
        }
        metrics.push(record);
        Ok(())
    }
}

impl DiscoverySink for RecordingSink {
    fn push(&self, record: DiscoveryRecord) -> Result<(), SinkError> {
        let mut discovery = self.discovery.lock().map_err(|_| SinkError::Disconnected)?;
        discovery.push(record);
        Ok(())
    }
}
