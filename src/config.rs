//! Collector configuration.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

/// Default statistics channel address.
pub const DEFAULT_STATISTICS_HOST: &str = "127.0.0.1";
/// Default statistics channel port.
pub const DEFAULT_STATISTICS_PORT: u16 = 5353;
/// Default upper bound for one HTTP fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Default upper bound for one `rndc status` run.
pub const DEFAULT_RNDC_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for one monitored name server.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    /// Path to the control utility. `None` disables rndc metrics.
    pub rndc_path: Option<PathBuf>,
    pub statistics_host: String,
    pub statistics_port: u16,
    /// Host name stamped on every record.
    pub hostname: String,
    pub fetch_timeout: Duration,
    pub rndc_timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            rndc_path: None,
            statistics_host: DEFAULT_STATISTICS_HOST.to_string(),
            statistics_port: DEFAULT_STATISTICS_PORT,
            hostname: detect_hostname(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            rndc_timeout: DEFAULT_RNDC_TIMEOUT,
        }
    }
}

/// Get machine hostname via the `hostname` command, `localhost` if that fails.
pub fn detect_hostname() -> String {
    Command::new("hostname")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
