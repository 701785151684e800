//! Low-level discovery of views and zones.

use super::view::{named_views, zones};
use crate::collector::document::StatsDocument;
use crate::model::discovery::{VIEW_NAME_MACRO, ZONE_NAME_MACRO, entry};
use crate::model::{DiscoveryRecord, VIEW_LLD_KEY, ZONE_LLD_KEY};

/// Builds the discovery records of a document.
///
/// For every view this yields one `named.view.LLD` record listing all view
/// names, followed by one `named.zone.LLD` record per zone of that view. The
/// view list is therefore repeated once per view; downstream templates have
/// always received it that way.
pub fn build_discovery(doc: &StatsDocument, host: &str) -> Vec<DiscoveryRecord> {
    let views: Vec<_> = named_views(doc).collect();
    let all_views: Vec<_> = views
        .iter()
        .map(|(name, _)| entry(VIEW_NAME_MACRO, *name))
        .collect();

    let mut records = Vec::new();
    for (_, view) in &views {
        records.push(DiscoveryRecord::new(VIEW_LLD_KEY, all_views.clone(), host));
        for (zone, _) in zones(view) {
            records.push(DiscoveryRecord::new(
                ZONE_LLD_KEY,
                vec![entry(ZONE_NAME_MACRO, zone)],
                host,
            ));
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::scenarios;

    #[test]
    fn test_view_list_repeated_per_view() {
        let doc = StatsDocument::parse(scenarios::TYPICAL_SERVER.as_bytes()).unwrap();
        let records = build_discovery(&doc, "ns1");

        let view_records: Vec<_> = records.iter().filter(|r| r.key == VIEW_LLD_KEY).collect();
        assert_eq!(view_records.len(), 2);
        for record in view_records {
            let names: Vec<&str> = record.values_of(VIEW_NAME_MACRO).collect();
            assert_eq!(names, vec!["internal", "external"]);
            assert_eq!(record.host, "ns1");
        }
    }

    #[test]
    fn test_zone_records_follow_their_view() {
        let doc = StatsDocument::parse(scenarios::TYPICAL_SERVER.as_bytes()).unwrap();
        let records = build_discovery(&doc, "ns1");

        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                VIEW_LLD_KEY,
                ZONE_LLD_KEY,
                ZONE_LLD_KEY,
                VIEW_LLD_KEY,
                ZONE_LLD_KEY
            ]
        );

        let zones: Vec<&str> = records
            .iter()
            .flat_map(|r| r.values_of(ZONE_NAME_MACRO))
            .collect();
        assert_eq!(zones, vec!["example.com", "10.in-addr.arpa", "example.net"]);
    }

    #[test]
    fn test_no_views_no_records() {
        let doc = StatsDocument::parse(scenarios::MINIMAL_SERVER.as_bytes()).unwrap();
        assert!(build_discovery(&doc, "ns1").is_empty());
    }

    #[test]
    fn test_discovery_json_shape() {
        let doc = StatsDocument::parse(scenarios::SINGLE_ENTRIES.as_bytes()).unwrap();
        let records = build_discovery(&doc, "ns1");
        let json = serde_json::to_value(&records[1]).unwrap();
        assert_eq!(json["key"], "named.zone.LLD");
        assert_eq!(json["value"][0]["{#ZONE_NAME}"], "only.example");
    }
}
