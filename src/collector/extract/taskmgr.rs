//! Task manager thread model.

use crate::collector::document::{ParseError, StatsDocument};
use crate::model::{MetricBatch, item_key};

const THREAD_MODEL_PATH: &[&str] = &["taskmgr", "thread-model"];
const FIELDS: &[&str] = &["worker-threads", "tasks-running"];

/// Extracts `worker-threads` and `tasks-running`.
///
/// Unlike the other sections this one is required: a document without it is
/// not a usable statistics document and the rest of the pass is abandoned.
pub fn extract_taskmgr(doc: &StatsDocument) -> Result<MetricBatch, ParseError> {
    let model = doc
        .statistics()
        .and_then(|stats| stats.find(THREAD_MODEL_PATH))
        .ok_or_else(|| ParseError::MissingSubtree(THREAD_MODEL_PATH.join("/")))?;

    let mut batch = MetricBatch::new();
    for &field in FIELDS {
        let value = model.child_text(field).ok_or_else(|| {
            ParseError::MissingSubtree(format!("{}/{}", THREAD_MODEL_PATH.join("/"), field))
        })?;
        batch.insert(item_key("named.statistics.taskmgr", &[field]), value);
    }

    Ok(batch)
}
