//! namedstatd - BIND name server statistics agent.
//!
//! Polls the statistics channel and `rndc status` at a fixed interval and
//! writes every record as one JSON line to stdout.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::Parser;
use flume::Receiver;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use namedstat::collector::{Job, NamedCollector};
use namedstat::config::{
    CollectorConfig, DEFAULT_STATISTICS_HOST, DEFAULT_STATISTICS_PORT, detect_hostname,
};
use namedstat::sink::{QueueItem, QueueSink};

/// BIND name server statistics agent.
#[derive(Parser)]
#[command(name = "namedstatd", about = "BIND name server statistics agent", version)]
struct Args {
    /// Path to the rndc utility. Unset disables rndc metrics.
    #[arg(long, env = "NAMEDSTAT_RNDC_PATH", value_name = "PATH")]
    rndc_path: Option<PathBuf>,

    /// Statistics channel address.
    #[arg(long, env = "NAMEDSTAT_STATISTICS_HOST", default_value = DEFAULT_STATISTICS_HOST)]
    statistics_host: String,

    /// Statistics channel port.
    #[arg(long, env = "NAMEDSTAT_STATISTICS_PORT", default_value_t = DEFAULT_STATISTICS_PORT)]
    statistics_port: u16,

    /// Host name stamped on records. Defaults to the output of `hostname`.
    #[arg(long, env = "NAMEDSTAT_HOSTNAME")]
    hostname: Option<String>,

    /// Collection interval in seconds.
    #[arg(short, long, default_value = "60")]
    interval: u64,

    /// Run discovery every N cycles (0 disables discovery).
    #[arg(long, default_value = "60")]
    discovery_every: u64,

    /// Capacity of the outgoing record queue.
    #[arg(long, default_value = "10000")]
    queue_size: usize,

    /// Timeout for one statistics fetch, in seconds.
    #[arg(long, default_value = "10")]
    fetch_timeout: u64,

    /// Timeout for one `rndc status` run, in seconds.
    #[arg(long, default_value = "10")]
    rndc_timeout: u64,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            rndc_path: self.rndc_path.clone(),
            statistics_host: self.statistics_host.clone(),
            statistics_port: self.statistics_port,
            hostname: self.hostname.clone().unwrap_or_else(detect_hostname),
            fetch_timeout: Duration::from_secs(self.fetch_timeout),
            rndc_timeout: Duration::from_secs(self.rndc_timeout),
        }
    }
}

/// Initializes the tracing subscriber. Logs go to stderr, stdout carries records.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["namedstatd", "namedstat"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Whether the discovery pass runs on this cycle. Cycle 0 always runs.
fn discovery_due(cycle: u64, every: u64) -> bool {
    every > 0 && cycle.is_multiple_of(every)
}

/// Drains the queue, one JSON line per record, until every sender is dropped.
fn write_records(rx: Receiver<QueueItem>, mut out: impl Write) -> usize {
    let mut written = 0;
    for item in rx.iter() {
        let line = match serde_json::to_string(&item) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize record: {}", e);
                continue;
            }
        };
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            error!("Failed to write record: {}", e);
            break;
        }
        written += 1;
    }
    written
}

/// Runs the writer until the queue closes or output fails, then stops the poll loop.
fn run_writer(rx: Receiver<QueueItem>, out: impl Write, running: &AtomicBool) -> usize {
    let written = write_records(rx, out);
    if running.swap(false, Ordering::SeqCst) {
        error!("Record writer stopped, shutting down");
    }
    written
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = args.collector_config();

    info!("namedstatd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, statistics={}:{}, host={}",
        args.interval, config.statistics_host, config.statistics_port, config.hostname
    );
    match config.rndc_path {
        Some(ref path) => info!("rndc: {}", path.display()),
        None => info!("rndc: disabled (no path configured)"),
    }
    if args.discovery_every == 0 {
        info!("Discovery: disabled");
    }

    let collector = match NamedCollector::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create collector: {}", e);
            std::process::exit(1);
        }
    };

    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    let (tx, rx) = flume::bounded(args.queue_size.max(1));
    let sink = QueueSink::new(tx);
    let writer = {
        let running = running.clone();
        thread::spawn(move || run_writer(rx, std::io::stdout().lock(), &running))
    };

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting collection loop");

    let mut cycle: u64 = 0;
    while running.load(Ordering::SeqCst) {
        if discovery_due(cycle, args.discovery_every) {
            let summary = collector.produce_discovery(&sink);
            debug!(
                "Discovery #{}: {} records, {} rejected in {:?}",
                cycle, summary.emitted, summary.rejected, summary.elapsed
            );
        }

        let summary = collector.produce_metrics(&sink);
        if summary.failed_passes.is_empty() {
            info!(
                "Cycle #{}: {} metrics in {:?}",
                cycle, summary.emitted, summary.elapsed
            );
        } else {
            warn!(
                "Cycle #{}: {} metrics in {:?}, failed: {}",
                cycle,
                summary.emitted,
                summary.elapsed,
                summary.failed_passes.join(", ")
            );
        }
        cycle += 1;

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!("Shutting down...");

    drop(sink);
    match writer.join() {
        Ok(written) => info!("Wrote {} records", written),
        Err(_) => error!("Writer thread panicked"),
    }

    info!("Shutdown complete");
}
