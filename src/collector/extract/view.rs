//! Per-view statistics: zone serials, resolver counters and cache RR-sets.

use tracing::debug;

use super::{RRSET, name_counter, pre_zeroed, strip_zone_class};
use crate::collector::document::{Element, ParseError, StatsDocument};
use crate::model::{MetricBatch, item_key};

/// Location of the view list below the statistics element.
pub(crate) const VIEWS_PATH: &[&str] = &["views", "view"];

/// Iterates the named views of a document, skipping nameless entries.
pub(crate) fn named_views(doc: &StatsDocument) -> impl Iterator<Item = (&str, &Element)> {
    doc.statistics()
        .into_iter()
        .flat_map(|stats| stats.find_all(VIEWS_PATH))
        .filter_map(|view| match view.child_text("name") {
            Some(name) => Some((name, view)),
            None => {
                debug!("skipping view without a name");
                None
            }
        })
}

/// Iterates `(zone, serial)` pairs of a view with the class suffix removed.
pub(crate) fn zones(view: &Element) -> impl Iterator<Item = (&str, Option<&str>)> {
    view.find_all(&["zones", "zone"]).filter_map(|zone| {
        let name = zone.child_text("name")?;
        Some((strip_zone_class(name), zone.child_text("serial")))
    })
}

/// Extracts zone serials, `resstat` counters and cache RR-set counters.
///
/// Every RR-set type of [`RRSET`] is reported for every view, as 0 when the
/// view has no cache section or the type has no counter.
pub fn extract_views(doc: &StatsDocument) -> Result<MetricBatch, ParseError> {
    let mut batch = MetricBatch::new();

    for (view_name, view) in named_views(doc) {
        for (zone, serial) in zones(view) {
            match serial {
                Some(serial) => {
                    batch.insert(item_key("named.statistics.zone.serial", &[zone]), serial)
                }
                None => debug!("zone {} in view {} has no serial", zone, view_name),
            }
        }

        for (name, counter) in view.children("resstat").filter_map(name_counter) {
            batch.insert(
                item_key("named.statistics.resstat", &[view_name, name]),
                counter,
            );
        }

        let rrsets = view.find_all(&["cache", "rrset"]);
        pre_zeroed(&mut batch, RRSET, rrsets, |rr| {
            item_key("named.statistics.cache", &[view_name, rr])
        });
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::scenarios;
    use crate::model::MetricValue;

    fn text(batch: &MetricBatch, key: &str) -> Option<String> {
        batch.get(key).map(MetricValue::to_string)
    }

    #[test]
    fn test_zone_serials_strip_class() {
        let doc = StatsDocument::parse(scenarios::TYPICAL_SERVER.as_bytes()).unwrap();
        let batch = extract_views(&doc).unwrap();

        assert_eq!(
            text(&batch, "named.statistics.zone.serial[example.com]").as_deref(),
            Some("2024010101")
        );
        assert_eq!(
            text(&batch, "named.statistics.zone.serial[example.net]").as_deref(),
            Some("7")
        );
        assert_eq!(
            text(&batch, "named.statistics.zone.serial[10.in-addr.arpa]").as_deref(),
            Some("1")
        );
        assert!(batch.get("named.statistics.zone.serial[example.com/IN]").is_none());
    }

    #[test]
    fn test_resstat_keyed_by_view() {
        let doc = StatsDocument::parse(scenarios::TYPICAL_SERVER.as_bytes()).unwrap();
        let batch = extract_views(&doc).unwrap();

        assert_eq!(
            text(&batch, "named.statistics.resstat[internal,Queryv4]").as_deref(),
            Some("120")
        );
        assert_eq!(
            text(&batch, "named.statistics.resstat[external,NXDOMAIN]").as_deref(),
            Some("3")
        );
    }

    #[test]
    fn test_cache_is_pre_zeroed() {
        let doc = StatsDocument::parse(scenarios::TYPICAL_SERVER.as_bytes()).unwrap();
        let batch = extract_views(&doc).unwrap();

        // internal has a partial cache section, external has none at all
        for view in ["internal", "external"] {
            for rr in RRSET {
                let key = format!("named.statistics.cache[{},{}]", view, rr);
                assert!(batch.get(&key).is_some(), "missing {}", key);
            }
        }
        assert_eq!(
            batch.get("named.statistics.cache[internal,A]"),
            Some(&MetricValue::Text("31".into()))
        );
        assert_eq!(
            batch.get("named.statistics.cache[internal,!AAAA]"),
            Some(&MetricValue::Text("2".into()))
        );
        assert_eq!(
            batch.get("named.statistics.cache[internal,MX]"),
            Some(&MetricValue::Int(0))
        );
        assert_eq!(
            batch.get("named.statistics.cache[external,A]"),
            Some(&MetricValue::Int(0))
        );
    }

    #[test]
    fn test_single_view_single_entries() {
        let doc = StatsDocument::parse(scenarios::SINGLE_ENTRIES.as_bytes()).unwrap();
        let batch = extract_views(&doc).unwrap();

        assert_eq!(
            text(&batch, "named.statistics.zone.serial[only.example]").as_deref(),
            Some("5")
        );
        assert_eq!(
            text(&batch, "named.statistics.resstat[_default,Queryv6]").as_deref(),
            Some("9")
        );
        assert_eq!(
            text(&batch, "named.statistics.cache[_default,NS]").as_deref(),
            Some("4")
        );
        // one zone + one resstat + the full RR-set table
        assert_eq!(batch.len(), 2 + RRSET.len());
    }

    #[test]
    fn test_no_views_section() {
        let doc = StatsDocument::parse(scenarios::MINIMAL_SERVER.as_bytes()).unwrap();
        let batch = extract_views(&doc).unwrap();
        assert!(batch.is_empty());
    }
}
