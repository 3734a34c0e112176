//! History and rollback
//!
//! Snapshots are appended by the state machine; this module restores them.

use crate::record::{LogEntry, Record};
use crate::types::Severity;

/// Restore the snapshot at `step_index`.
///
/// The result equals `history[step_index]` with the history truncated to
/// the entries before it and one log line recording the rollback. An index
/// past the end returns the record unchanged; callers may probe freely.
#[must_use]
pub fn rollback(record: &Record, step_index: usize) -> Record {
    let Some(target) = record.history.get(step_index) else {
        tracing::debug!(
            id = %record.id(),
            step_index,
            len = record.history.len(),
            "rollback index out of range, ignoring"
        );
        return record.clone();
    };

    let mut state = target.clone();
    state.logs.push(
        LogEntry::new(
            Severity::Warning,
            format!(
                "Rolled back to snapshot #{step_index}. Status restored to {}.",
                target.status
            ),
        )
        .by("Human Operator"),
    );

    tracing::info!(id = %record.id(), step_index, status = %target.status, "rolled back");
    Record {
        state,
        history: record.history[..step_index].to_vec(),
    }
}

/// [`rollback`] with a signed index, as supplied by user intents.
///
/// Negative indices are a no-op like any other out-of-range index.
#[must_use]
pub fn rollback_signed(record: &Record, step_index: i64) -> Record {
    match usize::try_from(step_index) {
        Ok(index) => rollback(record, index),
        Err(_) => record.clone(),
    }
}
