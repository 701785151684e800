//! Server-wide statistics: timestamps, request opcodes, incoming query types
//! and the name-server, zone and socket counter tables.

use super::{OPCODES, RDTYPE, name_counter, pre_zeroed};
use crate::collector::document::{ParseError, StatsDocument};
use crate::model::{MetricBatch, item_key};

const TIMESTAMPS: &[&str] = &["boot-time", "current-time"];
const PASS_THROUGH: &[&str] = &["nsstat", "zonestat", "sockstat"];

/// Extracts the `server` section.
///
/// Opcodes and query types are reported for the full default tables even
/// when the server has not seen any such traffic yet.
pub fn extract_server(doc: &StatsDocument) -> Result<MetricBatch, ParseError> {
    let mut batch = MetricBatch::new();
    let Some(server) = doc.statistics().and_then(|stats| stats.child("server")) else {
        return Ok(batch);
    };

    for &field in TIMESTAMPS {
        if let Some(value) = server.child_text(field) {
            batch.insert(item_key("named.statistics.server", &[field]), value);
        }
    }

    pre_zeroed(
        &mut batch,
        OPCODES,
        server.find_all(&["requests", "opcode"]),
        |name| item_key("named.statistics.server.opcode", &[name]),
    );

    pre_zeroed(
        &mut batch,
        RDTYPE,
        server.find_all(&["queries-in", "rdtype"]),
        |name| item_key("named.statistics.server.queries-in", &[name]),
    );

    for &table in PASS_THROUGH {
        let namespace = format!("named.statistics.server.{}", table);
        for (name, counter) in server.children(table).filter_map(name_counter) {
            batch.insert(item_key(&namespace, &[name]), counter);
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::scenarios;
    use crate::model::MetricValue;

    fn parse(xml: &str) -> MetricBatch {
        let doc = StatsDocument::parse(xml.as_bytes()).unwrap();
        extract_server(&doc).unwrap()
    }

    fn server_doc(body: &str) -> String {
        format!(
            "<isc><bind><statistics><server>{}</server></statistics></bind></isc>",
            body
        )
    }

    #[test]
    fn test_timestamps() {
        let batch = parse(scenarios::TYPICAL_SERVER);
        assert_eq!(
            batch.get("named.statistics.server[boot-time]"),
            Some(&MetricValue::Text("2024-01-01T00:00:00Z".into()))
        );
        assert_eq!(
            batch.get("named.statistics.server[current-time]"),
            Some(&MetricValue::Text("2024-01-02T12:30:00Z".into()))
        );
    }

    #[test]
    fn test_opcodes_pre_zeroed_and_overwritten() {
        let batch = parse(scenarios::TYPICAL_SERVER);
        assert_eq!(
            batch.get("named.statistics.server.opcode[QUERY]"),
            Some(&MetricValue::Text("1000".into()))
        );
        assert_eq!(
            batch.get("named.statistics.server.opcode[NOTIFY]"),
            Some(&MetricValue::Text("2".into()))
        );
        assert_eq!(
            batch.get("named.statistics.server.opcode[UPDATE]"),
            Some(&MetricValue::Int(0))
        );
    }

    #[test]
    fn test_queries_in_covers_full_table_plus_extras() {
        let batch = parse(scenarios::TYPICAL_SERVER);
        for rd in RDTYPE {
            let key = format!("named.statistics.server.queries-in[{}]", rd);
            assert!(batch.get(&key).is_some(), "missing {}", key);
        }
        assert_eq!(
            batch.get("named.statistics.server.queries-in[AAAA]"),
            Some(&MetricValue::Text("200".into()))
        );
        assert_eq!(
            batch.get("named.statistics.server.queries-in[SOA]"),
            Some(&MetricValue::Int(0))
        );
        assert_eq!(
            batch.get("named.statistics.server.queries-in[TYPE65]"),
            Some(&MetricValue::Text("5".into()))
        );
    }

    #[test]
    fn test_single_and_list_opcodes_agree() {
        let single = parse(&server_doc(
            "<requests><opcode><name>QUERY</name><counter>17</counter></opcode></requests>\
             <queries-in><rdtype><name>A</name><counter>12</counter></rdtype></queries-in>",
        ));
        let list = parse(&server_doc(
            "<requests>\
               <opcode><name>QUERY</name><counter>17</counter></opcode>\
               <opcode><name>UPDATE</name><counter>0</counter></opcode>\
             </requests>\
             <queries-in>\
               <rdtype><name>A</name><counter>12</counter></rdtype>\
               <rdtype><name>MX</name><counter>0</counter></rdtype>\
             </queries-in>",
        ));

        assert_eq!(single.len(), list.len());
        for (key, value) in single.iter() {
            assert_eq!(
                list.get(key).map(|v| v.to_string()),
                Some(value.to_string()),
                "{}",
                key
            );
        }
    }

    #[test]
    fn test_empty_requests_keeps_defaults() {
        let batch = parse(scenarios::MINIMAL_SERVER);
        for op in OPCODES {
            let key = format!("named.statistics.server.opcode[{}]", op);
            assert_eq!(batch.get(&key), Some(&MetricValue::Int(0)));
        }
        assert_eq!(
            batch.get("named.statistics.server.queries-in[A]"),
            Some(&MetricValue::Int(0))
        );
    }

    #[test]
    fn test_pass_through_tables() {
        let batch = parse(scenarios::TYPICAL_SERVER);
        assert_eq!(
            batch.get("named.statistics.server.nsstat[Requestv4]"),
            Some(&MetricValue::Text("1000".into()))
        );
        assert_eq!(
            batch.get("named.statistics.server.zonestat[NotifyOutv4]"),
            Some(&MetricValue::Text("2".into()))
        );
        assert_eq!(
            batch.get("named.statistics.server.sockstat[UDP4Open]"),
            Some(&MetricValue::Text("40".into()))
        );
        assert!(batch.get("named.statistics.server.nsstat[Nonexistent]").is_none());
    }

    #[test]
    fn test_missing_server_section() {
        let batch = parse("<isc><bind><statistics/></bind></isc>");
        assert!(batch.is_empty());
    }
}
