//! Extractors turning a [`StatsDocument`] into metric batches.
//!
//! Each extractor walks one subtree and returns its own [`MetricBatch`]. They
//! share no state, never touch a sink and are safe to call in any order.
//! Absent optional subtrees produce an empty batch; only the task manager
//! section is required.

pub mod discovery;
pub mod memory;
pub mod server;
pub mod taskmgr;
pub mod view;

use crate::collector::document::{Element, ParseError, StatsDocument};
use crate::model::MetricBatch;

pub use discovery::build_discovery;
pub use memory::extract_memory;
pub use server::extract_server;
pub use taskmgr::extract_taskmgr;
pub use view::extract_views;

/// Signature shared by all metric extractors.
pub type ExtractFn = fn(&StatsDocument) -> Result<MetricBatch, ParseError>;

/// Extractors of the statistics pass, in emission order.
pub const EXTRACTORS: &[(&str, ExtractFn)] = &[
    ("views", extract_views),
    ("taskmgr", extract_taskmgr),
    ("server", extract_server),
    ("memory", extract_memory),
];

/// Cache RR-set types reported for every view, including negative entries.
pub static RRSET: &[&str] = &[
    "A", "!A", "AAAA", "!AAAA", "DLV", "!DLV", "DS", "!DS", "MX", "!MX", "NS", "NSEC", "CNAME",
    "PTR", "RRSIG", "DNSKEY", "TXT", "NXDOMAIN",
];

/// Query types reported under `queries-in`.
pub static RDTYPE: &[&str] = &[
    "A", "AAAA", "ANY", "CNAME", "DLV", "DNSKEY", "DS", "MX", "NAPTR", "NS", "NSEC", "NXT",
    "Others", "PTR", "RESERVED0", "SOA", "SPF", "SRV", "SSHFP", "TXT", "X25",
];

/// Request opcodes reported under `requests`.
pub static OPCODES: &[&str] = &["QUERY", "NOTIFY", "UPDATE"];

/// Strips a trailing `/IN` or `/CF` class suffix from a zone name.
///
/// A bare suffix with nothing in front of it is left alone.
pub fn strip_zone_class(name: &str) -> &str {
    ["/IN", "/CF"]
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|zone| !zone.is_empty())
        .unwrap_or(name)
}

/// Reads the `(name, counter)` pair of a counter element.
pub(crate) fn name_counter(el: &Element) -> Option<(&str, &str)> {
    Some((el.child_text("name")?, el.child_text("counter")?))
}

/// Inserts every `key` of `defaults` with value 0, then overwrites from the
/// counter elements found in `counters`.
pub(crate) fn pre_zeroed<'a>(
    batch: &mut MetricBatch,
    defaults: &[&str],
    counters: impl Iterator<Item = &'a Element>,
    key: impl Fn(&str) -> String,
) {
    for name in defaults {
        batch.insert(key(*name), 0i64);
    }
    for (name, counter) in counters.filter_map(name_counter) {
        batch.insert(key(name), counter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_zone_class() {
        assert_eq!(strip_zone_class("example.com/IN"), "example.com");
        assert_eq!(strip_zone_class("example.com/CF"), "example.com");
        assert_eq!(strip_zone_class("example.net"), "example.net");
        assert_eq!(strip_zone_class("example.org/CH"), "example.org/CH");
        assert_eq!(strip_zone_class("/IN"), "/IN");
    }

    #[test]
    fn test_tables_have_no_duplicates() {
        for table in [RRSET, RDTYPE, OPCODES] {
            let mut sorted = table.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), table.len());
        }
    }

    #[test]
    fn test_name_counter_requires_both_fields() {
        let full = Element::new("rrset")
            .with_child(Element::new("name").with_text("A"))
            .with_child(Element::new("counter").with_text("7"));
        assert_eq!(name_counter(&full), Some(("A", "7")));

        let partial = Element::new("rrset").with_child(Element::new("name").with_text("A"));
        assert_eq!(name_counter(&partial), None);
    }
}
