//! Memory contexts and allocator summary.

use tracing::{debug, warn};

use crate::collector::document::{ParseError, StatsDocument};
use crate::model::{MetricBatch, item_key};

/// Contexts whose name starts with this prefix are reported as one.
const RESOLVER_PREFIX: &str = "res";
const SUMMARY_FIELDS: &[&str] = &["TotalUse", "InUse", "BlockSize", "ContextSize", "Lost"];

/// Dimension a memory context is accounted under.
fn context_dimension(name: &str) -> &str {
    if name.starts_with(RESOLVER_PREFIX) {
        RESOLVER_PREFIX
    } else {
        name
    }
}

/// Extracts per-context `inuse` and the summary fields.
///
/// This is the one place values are summed rather than overwritten: the
/// name server keeps one context per resolver task, all of which fold into
/// a single `res` dimension.
pub fn extract_memory(doc: &StatsDocument) -> Result<MetricBatch, ParseError> {
    let mut batch = MetricBatch::new();
    let Some(memory) = doc.statistics().and_then(|stats| stats.child("memory")) else {
        return Ok(batch);
    };

    let mut inuse: Vec<(&str, u64)> = Vec::new();
    for context in memory.find_all(&["contexts", "context"]) {
        let Some(name) = context.child_text("name") else {
            debug!("skipping memory context without a name");
            continue;
        };
        let bytes = match context.child_text("inuse").map(str::parse::<u64>) {
            Some(Ok(bytes)) => bytes,
            other => {
                debug!("memory context {} has unusable inuse: {:?}", name, other);
                0
            }
        };

        let dimension = context_dimension(name);
        match inuse.iter_mut().find(|(d, _)| *d == dimension) {
            Some((_, total)) => {
                *total = total.checked_add(bytes).unwrap_or_else(|| {
                    warn!("memory inuse for {} exceeds u64, reporting {}", dimension, u64::MAX);
                    u64::MAX
                });
            }
            None => inuse.push((dimension, bytes)),
        }
    }

    for (dimension, total) in inuse {
        batch.insert(item_key("named.statistics.memory.inuse", &[dimension]), total);
    }

    if let Some(summary) = memory.child("summary") {
        for &field in SUMMARY_FIELDS {
            if let Some(value) = summary.child_text(field) {
                batch.insert(item_key("named.statistics.memory.summary", &[field]), value);
            }
        }
    }

    Ok(batch)
}
