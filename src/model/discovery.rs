//! Low-level discovery records.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

/// Discovery key listing every view.
pub const VIEW_LLD_KEY: &str = "named.view.LLD";
/// Discovery key announcing a single zone.
pub const ZONE_LLD_KEY: &str = "named.zone.LLD";

/// Macro name carried by view discovery entries.
pub const VIEW_NAME_MACRO: &str = "{#VIEW_NAME}";
/// Macro name carried by zone discovery entries.
pub const ZONE_NAME_MACRO: &str = "{#ZONE_NAME}";

/// One discovered entity: a single `{macro: value}` pair.
pub type DiscoveryEntry = BTreeMap<String, String>;

/// A discovery record as it is handed to a
/// [`DiscoverySink`](crate::sink::DiscoverySink).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryRecord {
    pub key: String,
    pub value: Vec<DiscoveryEntry>,
    pub host: String,
    pub clock: i64,
}

impl DiscoveryRecord {
    pub fn new(key: impl Into<String>, value: Vec<DiscoveryEntry>, host: &str) -> Self {
        Self {
            key: key.into(),
            value,
            host: host.to_string(),
            clock: Utc::now().timestamp(),
        }
    }

    /// Values carried under `macro_name`, in entry order.
    pub fn values_of<'a>(&'a self, macro_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.value
            .iter()
            .filter_map(move |entry| entry.get(macro_name).map(String::as_str))
    }
}

/// Builds a single-field discovery entry.
pub fn entry(macro_name: &str, value: impl Into<String>) -> DiscoveryEntry {
    let mut map = BTreeMap::new();
    map.insert(macro_name.to_string(), value.into());
    map
}
