//! Records produced by the collector.

pub mod discovery;
pub mod metric;

pub use discovery::{DiscoveryEntry, DiscoveryRecord, VIEW_LLD_KEY, ZONE_LLD_KEY};
pub use metric::{MetricBatch, MetricRecord, MetricValue, item_key};
