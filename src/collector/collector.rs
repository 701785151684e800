//! Poll-cycle driver combining the statistics channel and rndc passes.
//!
//! The `NamedCollector` fetches and parses the statistics document once per
//! pass, runs every extractor over it and pushes the results to the sinks.
//! Each sub-pass owns its failures: they are logged and never abort a
//! sibling pass.

use std::time::{Duration, Instant};

use tracing::{debug, error, trace, warn};

use crate::collector::document::StatsDocument;
use crate::collector::extract::{EXTRACTORS, build_discovery};
use crate::collector::fetch::{FetchError, HttpSource};
use crate::collector::rndc::{ProcessRunner, RndcCollector};
use crate::collector::traits::{CommandRunner, StatsSource};
use crate::config::CollectorConfig;
use crate::model::MetricBatch;
use crate::sink::{DiscoverySink, MetricSink, SinkError};

/// Heartbeat keys watched by existing backend templates.
pub const PING_KEY: &str = "blackbird.named.ping";
pub const VERSION_KEY: &str = "blackbird.named.version";

/// Entry points invoked by the scheduler.
pub trait Job {
    /// Runs one metric cycle and pushes its records to `sink`.
    fn produce_metrics(&self, sink: &dyn MetricSink) -> CycleSummary;

    /// Runs one discovery cycle and pushes its records to `sink`.
    fn produce_discovery(&self, sink: &dyn DiscoverySink) -> CycleSummary;
}

/// Outcome of one cycle, used for logging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleSummary {
    /// Records accepted by the sink.
    pub emitted: usize,
    /// Records the sink refused.
    pub rejected: usize,
    /// Sub-passes that were skipped or cut short.
    pub failed_passes: Vec<&'static str>,
    pub elapsed: Duration,
}

impl CycleSummary {
    fn merge(&mut self, other: CycleSummary) {
        self.emitted += other.emitted;
        self.rejected += other.rejected;
        self.failed_passes.extend(other.failed_passes);
    }
}

/// Collector for one name server.
pub struct NamedCollector<S: StatsSource, R: CommandRunner> {
    source: S,
    rndc: RndcCollector<R>,
    hostname: String,
}

impl NamedCollector<HttpSource, ProcessRunner> {
    /// Creates a collector talking to a real name server.
    pub fn from_config(config: &CollectorConfig) -> Result<Self, FetchError> {
        let source = HttpSource::new(
            &config.statistics_host,
            config.statistics_port,
            config.fetch_timeout,
        )?;
        Ok(Self::new(source, ProcessRunner::new(), config))
    }
}

impl<S: StatsSource, R: CommandRunner> NamedCollector<S, R> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `source` - Statistics source (HTTP or mock)
    /// * `runner` - Command runner for rndc (real or mock)
    /// * `config` - Hostname, rndc path and rndc timeout are taken from here
    pub fn new(source: S, runner: R, config: &CollectorConfig) -> Self {
        Self {
            source,
            rndc: RndcCollector::new(runner, config.rndc_path.clone(), config.rndc_timeout),
            hostname: config.hostname.clone(),
        }
    }

    /// Items reporting that the agent itself is alive.
    pub fn heartbeat(&self) -> MetricBatch {
        let mut batch = MetricBatch::new();
        batch.insert(PING_KEY, 1i64);
        batch.insert(VERSION_KEY, env!("CARGO_PKG_VERSION"));
        batch
    }

    /// Fetches and parses the statistics document.
    ///
    /// Returns `None`, after logging, when either step fails.
    fn fetch_document(&self) -> Option<StatsDocument> {
        let body = match self.source.fetch() {
            Ok(body) => body,
            Err(e) => {
                debug!(
                    "can not open \"{}\", failed to get statistics: {}",
                    self.source.describe(),
                    e
                );
                return None;
            }
        };

        match StatsDocument::parse(&body) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("statistics from {} not usable: {}", self.source.describe(), e);
                None
            }
        }
    }

    /// Pushes a batch, counting rejections instead of stopping at them.
    fn emit(&self, sink: &dyn MetricSink, pass: &'static str, batch: MetricBatch) -> CycleSummary {
        let mut summary = CycleSummary::default();
        let mut last_error: Option<SinkError> = None;

        for record in batch.into_records(&self.hostname) {
            trace!("Inserted to queue {}:{}", record.key, record.value);
            match sink.push(record) {
                Ok(()) => summary.emitted += 1,
                Err(e) => {
                    summary.rejected += 1;
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            warn!("{}: sink rejected {} records ({})", pass, summary.rejected, e);
        }
        summary
    }

    /// Statistics channel pass: fetch, parse, run every extractor.
    ///
    /// A failing extractor ends the pass; batches of the extractors before it
    /// have already been pushed.
    pub fn produce_statistics(&self, sink: &dyn MetricSink) -> CycleSummary {
        let mut summary = CycleSummary::default();
        let Some(doc) = self.fetch_document() else {
            summary.failed_passes.push("statistics");
            return summary;
        };

        for &(name, extract) in EXTRACTORS {
            match extract(&doc) {
                Ok(batch) => {
                    debug!("{}: {} metrics", name, batch.len());
                    summary.merge(self.emit(sink, name, batch));
                }
                Err(e) => {
                    warn!("{}: {}, skipping remaining statistics", name, e);
                    summary.failed_passes.push(name);
                    break;
                }
            }
        }
        summary
    }

    /// rndc pass: run `rndc status` and push what it reported.
    pub fn produce_rndc(&self, sink: &dyn MetricSink) -> CycleSummary {
        match self.rndc.collect() {
            Ok(report) => {
                let mut summary = self.emit(sink, "rndc", report.metrics);
                if let Some(e) = report.error {
                    error!("{}", e);
                    summary.failed_passes.push("rndc");
                }
                summary
            }
            Err(e) => {
                error!("{}", e);
                CycleSummary {
                    failed_passes: vec!["rndc"],
                    ..CycleSummary::default()
                }
            }
        }
    }
}

impl<S: StatsSource, R: CommandRunner> Job for NamedCollector<S, R> {
    fn produce_metrics(&self, sink: &dyn MetricSink) -> CycleSummary {
        let start = Instant::now();

        let mut summary = self.emit(sink, "heartbeat", self.heartbeat());
        summary.merge(self.produce_statistics(sink));
        summary.merge(self.produce_rndc(sink));

        summary.elapsed = start.elapsed();
        summary
    }

    fn produce_discovery(&self, sink: &dyn DiscoverySink) -> CycleSummary {
        let start = Instant::now();
        let mut summary = CycleSummary::default();

        match self.fetch_document() {
            Some(doc) => {
                for record in build_discovery(&doc, &self.hostname) {
                    trace!("Inserted to queue {} ({} entries)", record.key, record.value.len());
                    match sink.push(record) {
                        Ok(()) => summary.emitted += 1,
                        Err(_) => summary.rejected += 1,
                    }
                }
                if summary.rejected > 0 {
                    warn!("discovery: sink rejected {} records", summary.rejected);
                }
            }
            None => summary.failed_passes.push("discovery"),
        }

        summary.elapsed = start.elapsed();
        summary
    }
}
