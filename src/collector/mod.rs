//! Statistics collector for a BIND name server.
//!
//! One collector serves one name server through two independent channels:
//! the HTTP statistics channel (an XML document) and the `rndc status`
//! control command.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       NamedCollector                        │
//! │  ┌─────────────────────────┐   ┌─────────────────────────┐  │
//! │  │  statistics pass        │   │  rndc pass              │  │
//! │  │  StatsDocument          │   │  RndcCollector          │  │
//! │  │  views/taskmgr/server/  │   │  parse_status           │  │
//! │  │  memory extractors      │   │                         │  │
//! │  └────────────┬────────────┘   └────────────┬────────────┘  │
//! │        ┌──────▼──────┐              ┌───────▼───────┐       │
//! │        │ StatsSource │ (trait)      │ CommandRunner │ (trait)
//! │        └──────┬──────┘              └───────┬───────┘       │
//! └───────────────┼─────────────────────────────┼───────────────┘
//!          ┌──────┴──────┐               ┌──────┴──────┐
//!   ┌──────▼─────┐ ┌─────▼──────┐ ┌──────▼──────┐ ┌────▼───────┐
//!   │ HttpSource │ │ MockSource │ │ProcessRunner│ │ MockRunner │
//!   └────────────┘ └────────────┘ └─────────────┘ └────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use namedstat::collector::{Job, NamedCollector};
//! use namedstat::collector::mock::{MockRunner, MockSource};
//! use namedstat::config::CollectorConfig;
//! use namedstat::sink::RecordingSink;
//!
//! let config = CollectorConfig::default();
//! let collector = NamedCollector::new(
//!     MockSource::typical_server(),
//!     MockRunner::typical_status(),
//!     &config,
//! );
//! let sink = RecordingSink::new();
//! collector.produce_metrics(&sink);
//! assert!(sink.value("blackbird.named.ping").is_some());
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod document;
pub mod extract;
pub mod fetch;
pub mod mock;
pub mod rndc;
pub mod traits;

pub use collector::{CycleSummary, Job, NamedCollector, PING_KEY, VERSION_KEY};
pub use document::{Element, ParseError, StatsDocument};
pub use fetch::{FetchError, HttpSource};
pub use rndc::{ProcessRunner, RndcCollector, RndcError};
pub use traits::{CommandRunner, StatsSource};
