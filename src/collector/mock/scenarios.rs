//! Pre-built statistics documents and status reports for testing.
//!
//! The documents follow the version 2 schema of the statistics channel
//! (`isc/bind/statistics`).

use super::inputs::{MockRunner, MockSource};

/// Two views, a partial cache, list-shaped counters everywhere.
pub const TYPICAL_SERVER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<?xml-stylesheet type="text/xsl" href="/bind9.xsl"?>
<isc version="1.0">
  <bind>
    <statistics version="2.2">
      <views>
        <view>
          <name>internal</name>
          <zones>
            <zone>
              <name>example.com/IN</name>
              <rdataclass>IN</rdataclass>
              <serial>2024010101</serial>
            </zone>
            <zone>
              <name>10.in-addr.arpa/IN</name>
              <rdataclass>IN</rdataclass>
              <serial>1</serial>
            </zone>
          </zones>
          <resstat><name>Queryv4</name><counter>120</counter></resstat>
          <resstat><name>Queryv6</name><counter>4</counter></resstat>
          <cache name="internal">
            <rrset><name>A</name><counter>31</counter></rrset>
            <rrset><name>!AAAA</name><counter>2</counter></rrset>
            <rrset><name>NS</name><counter>5</counter></rrset>
          </cache>
        </view>
        <view>
          <name>external</name>
          <zones>
            <zone>
              <name>example.net/CF</name>
              <rdataclass>IN</rdataclass>
              <serial>7</serial>
            </zone>
          </zones>
          <resstat><name>Queryv4</name><counter>50</counter></resstat>
          <resstat><name>NXDOMAIN</name><counter>3</counter></resstat>
        </view>
      </views>
      <socketmgr>
        <sockets/>
      </socketmgr>
      <taskmgr>
        <thread-model>
          <type>threaded</type>
          <worker-threads>4</worker-threads>
          <default-quantum>10</default-quantum>
          <tasks-running>1</tasks-running>
        </thread-model>
        <tasks>
          <task><id>0x7f0a</id><name>res0</name><references>1</references><state>idle</state></task>
        </tasks>
      </taskmgr>
      <server>
        <boot-time>2024-01-01T00:00:00Z</boot-time>
        <current-time>2024-01-02T12:30:00Z</current-time>
        <requests>
          <opcode><name>QUERY</name><counter>1000</counter></opcode>
          <opcode><name>NOTIFY</name><counter>2</counter></opcode>
        </requests>
        <queries-in>
          <rdtype><name>A</name><counter>700</counter></rdtype>
          <rdtype><name>AAAA</name><counter>200</counter></rdtype>
          <rdtype><name>MX</name><counter>30</counter></rdtype>
          <rdtype><name>TYPE65</name><counter>5</counter></rdtype>
        </queries-in>
        <nsstat><name>Requestv4</name><counter>1000</counter></nsstat>
        <nsstat><name>Response</name><counter>990</counter></nsstat>
        <zonestat><name>NotifyOutv4</name><counter>2</counter></zonestat>
        <sockstat><name>UDP4Open</name><counter>40</counter></sockstat>
        <sockstat><name>TCP4Open</name><counter>3</counter></sockstat>
      </server>
      <memory>
        <contexts>
          <context><id>0x01</id><name>main</name><references>200</references><total>4000</total><inuse>1000</inuse></context>
          <context><id>0x02</id><name>res0</name><references>1</references><total>20</total><inuse>10</inuse></context>
          <context><id>0x03</id><name>res1</name><references>1</references><total>20</total><inuse>5</inuse></context>
          <context><id>0x04</id><name>client</name><references>3</references><total>300</total><inuse>200</inuse></context>
          <context><id>0x05</id><name>client</name><references>3</references><total>300</total><inuse>50</inuse></context>
        </contexts>
        <summary>
          <TotalUse>5000</TotalUse>
          <InUse>1265</InUse>
          <BlockSize>4096</BlockSize>
          <ContextSize>2048</ContextSize>
          <Lost>0</Lost>
        </summary>
      </memory>
    </statistics>
  </bind>
</isc>
"#;

/// One view and exactly one entry in every repeatable section.
pub const SINGLE_ENTRIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<isc version="1.0">
  <bind>
    <statistics version="2.2">
      <views>
        <view>
          <name>_default</name>
          <zones>
            <zone><name>only.example/IN</name><rdataclass>IN</rdataclass><serial>5</serial></zone>
          </zones>
          <resstat><name>Queryv6</name><counter>9</counter></resstat>
          <cache name="_default">
            <rrset><name>NS</name><counter>4</counter></rrset>
          </cache>
        </view>
      </views>
      <taskmgr>
        <thread-model>
          <type>threaded</type>
          <worker-threads>1</worker-threads>
          <tasks-running>0</tasks-running>
        </thread-model>
      </taskmgr>
      <server>
        <boot-time>2024-03-01T08:00:00Z</boot-time>
        <current-time>2024-03-01T09:00:00Z</current-time>
        <requests>
          <opcode><name>QUERY</name><counter>17</counter></opcode>
        </requests>
        <queries-in>
          <rdtype><name>A</name><counter>12</counter></rdtype>
        </queries-in>
        <nsstat><name>Requestv4</name><counter>17</counter></nsstat>
        <zonestat><name>SOAOutv4</name><counter>1</counter></zonestat>
        <sockstat><name>UDP4Open</name><counter>6</counter></sockstat>
      </server>
      <memory>
        <contexts>
          <context><id>0x01</id><name>res0</name><inuse>42</inuse></context>
        </contexts>
        <summary>
          <TotalUse>100</TotalUse>
          <InUse>42</InUse>
          <BlockSize>1024</BlockSize>
          <ContextSize>512</ContextSize>
          <Lost>0</Lost>
        </summary>
      </memory>
    </statistics>
  </bind>
</isc>
"#;

/// Freshly started server: no views, no memory section, empty requests.
pub const MINIMAL_SERVER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<isc version="1.0">
  <bind>
    <statistics version="2.2">
      <taskmgr>
        <thread-model>
          <type>non-threaded</type>
          <worker-threads>0</worker-threads>
          <tasks-running>0</tasks-running>
        </thread-model>
      </taskmgr>
      <server>
        <boot-time>2024-03-01T08:00:00Z</boot-time>
        <current-time>2024-03-01T08:00:01Z</current-time>
        <requests/>
      </server>
    </statistics>
  </bind>
</isc>
"#;

/// Well-formed XML that is not a statistics document.
pub const NOT_STATISTICS: &str = "<html><body><h1>404 Not Found</h1></body></html>";

/// Typical `rndc status` output.
pub const RNDC_STATUS: &str = "\
version: 9.8
CPUs found: 2
worker threads: 2
number of zones: 1
debug level: 0
xfers running: 0
xfers deferred: 0
soa queries in progress: 0
query logging is OFF
recursive clients: 0/0/1000
tcp clients: 0/100
server is up and running
";

/// `rndc status` output interrupted by an error line.
pub const RNDC_STATUS_WITH_ERROR: &str = "\
worker threads: 4
number of zones: 12
zone reload error: example.com
debug level: 0
server is up and running
";

#[allow(dead_code)]
impl MockSource {
    /// Serves [`TYPICAL_SERVER`].
    pub fn typical_server() -> Self {
        Self::with_body(TYPICAL_SERVER)
    }

    /// Serves [`SINGLE_ENTRIES`].
    pub fn single_entries() -> Self {
        Self::with_body(SINGLE_ENTRIES)
    }

    /// Serves [`MINIMAL_SERVER`].
    pub fn minimal_server() -> Self {
        Self::with_body(MINIMAL_SERVER)
    }

    /// Serves a body that is not XML at all.
    pub fn garbage() -> Self {
        Self::with_body(&b"\x00\x01 definitely not <xml"[..])
    }
}

#[allow(dead_code)]
impl MockRunner {
    /// Prints [`RNDC_STATUS`].
    pub fn typical_status() -> Self {
        Self::with_output(RNDC_STATUS)
    }
}
